use gnucash_manifest::layout::{ENV_BUILD, ENV_LIB, ENV_SRC};

const ENV_MANIFEST: &str = "GNUCASH_BINDINGS_MANIFEST";

fn main() {
    println!("cargo:rerun-if-changed=wrapper.h");
    println!("cargo:rerun-if-changed=build.rs");
    for key in [ENV_SRC, ENV_BUILD, ENV_LIB, ENV_MANIFEST] {
        println!("cargo:rerun-if-env-changed={}", key);
    }

    #[cfg(feature = "engine")]
    engine::generate();
}

#[cfg(feature = "engine")]
mod engine {
    use std::path::PathBuf;

    use gnucash_manifest::{BindingManifest, SourceLayout};

    use super::ENV_MANIFEST;

    fn load_manifest() -> BindingManifest {
        let manifest = match std::env::var(ENV_MANIFEST) {
            Ok(path) if !path.is_empty() => {
                println!("cargo:rerun-if-changed={}", path);
                BindingManifest::from_path(&path)
                    .unwrap_or_else(|e| panic!("failed to load {}: {}", path, e))
            }
            _ => BindingManifest::default(),
        };
        if let Err(e) = manifest.validate() {
            panic!("invalid binding manifest: {}", e);
        }
        manifest
    }

    pub fn generate() {
        let manifest = load_manifest();
        let layout = SourceLayout::resolve(None, None, None);

        // Fail early with the full list instead of one clang error per header.
        if let Err(e) = layout.locate(&manifest) {
            panic!(
                "{} (src: {}, build: {})",
                e,
                layout.src_dir.display(),
                layout.build_dir.display()
            );
        }

        let glib = pkg_config::Config::new()
            .atleast_version("2.56")
            .probe("glib-2.0")
            .unwrap_or_else(|e| panic!("glib-2.0 not found via pkg-config: {}", e));

        let lib_dir = layout.lib_dir();
        println!("cargo:rustc-link-search=native={}", lib_dir.display());
        println!("cargo:rustc-link-lib=gnc-engine");
        println!("cargo:rustc-link-arg=-Wl,-rpath,{}", lib_dir.display());

        let mut builder = bindgen::Builder::default()
            .header("wrapper.h")
            .parse_callbacks(Box::new(bindgen::CargoCallbacks::new()))
            .derive_debug(manifest.derives.debug)
            .derive_default(manifest.derives.default)
            .derive_eq(manifest.derives.eq)
            .derive_hash(manifest.derives.hash);

        for dir in layout.include_dirs().iter().chain(glib.include_paths.iter()) {
            builder = builder.clang_arg(format!("-I{}", dir.display()));
        }
        for ty in &manifest.allowlist_types {
            builder = builder.allowlist_type(ty);
        }
        for func in &manifest.allowlist_functions {
            builder = builder.allowlist_function(func);
        }
        for ty in &manifest.blocklist_types {
            builder = builder.blocklist_type(ty);
        }
        for en in &manifest.rustified_enums {
            builder = builder.rustified_enum(en);
        }

        let bindings = builder
            .generate()
            .unwrap_or_else(|e| panic!("unable to generate bindings: {}", e));

        let out_path = PathBuf::from(std::env::var("OUT_DIR").expect("OUT_DIR is set by cargo"));
        bindings
            .write_to_file(out_path.join("bindings.rs"))
            .unwrap_or_else(|e| panic!("couldn't write bindings: {}", e));
    }
}
