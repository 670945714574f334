#[cfg(not(target_arch = "wasm32"))]
fn main() -> eframe::Result<()> {
    block_flow::native::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The wasm build starts through `block_flow::web::start`.
}
