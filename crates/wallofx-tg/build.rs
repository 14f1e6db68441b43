fn main() {
    let result = vergen::EmitBuilder::builder()
        .build_timestamp()
        .git_branch()
        .git_sha(false)
        .rustc_semver()
        .cargo_target_triple()
        .emit();

    // Builds from a source tarball have no git metadata, that's fine
    if let Err(err) = result {
        println!("cargo:warning=Failed to emit build metadata: {err:#}");
    }
}
