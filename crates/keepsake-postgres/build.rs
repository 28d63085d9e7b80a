#![forbid(unsafe_code)]

/// `embed_migrations!` cannot track files it did not see at expansion time,
/// so rerun the build whenever the migration directory changes.
fn main() {
    println!("cargo:rerun-if-changed=./migrations");
}
