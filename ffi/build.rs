use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=src/lib.rs");
    println!("cargo:rerun-if-changed=src/types.rs");

    let crate_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => return,
    };
    let header = crate_dir.join("include").join("mxreq.h");

    match cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_language(cbindgen::Language::C)
        .with_include_guard("MXREQ_H")
        .generate()
    {
        Ok(bindings) => {
            bindings.write_to_file(header);
        }
        // Header generation is best effort.
        Err(err) => println!("cargo:warning=cbindgen could not generate mxreq.h: {err}"),
    }
}
