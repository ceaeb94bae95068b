fn main() -> Result<(), Box<dyn std::error::Error>> {
    let proto_dir = "../proto";

    println!("cargo:rerun-if-changed={}/forum_service.proto", proto_dir);
    println!("cargo:rerun-if-env-changed=PROTOC");

    // Fall back to the bundled protoc when the host does not provide one.
    if std::env::var_os("PROTOC").is_none() {
        std::env::set_var("PROTOC", protoc_bin_vendored::protoc_bin_path()?);
    }

    tonic_build::configure()
        .build_server(true)
        .build_client(false)
        .compile_protos(&[format!("{proto_dir}/forum_service.proto")], &[proto_dir])?;

    Ok(())
}
