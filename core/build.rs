// Rebuild when the embedded site changes; include_dir does not track files itself.

fn main() {
    let site = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("site");
    if !site.join("index.html").exists() {
        println!("cargo:warning=site/index.html missing; the host will serve 404s");
    }
    println!("cargo:rerun-if-changed=../site");
}
