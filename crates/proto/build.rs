//! Build script for xfn-proto: compiles the function runner protocol.

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=proto/apiextensions/fn/proto/v1/run_function.proto");

    // Server only; every map is a BTreeMap so encoded responses are deterministic.
    tonic_build::configure()
        .build_server(true)
        .build_client(false)
        .btree_map(["."])
        .compile_protos(&["proto/apiextensions/fn/proto/v1/run_function.proto"], &["proto"])?;
    Ok(())
}
