mod app;
mod effects;
mod input;
mod render;

fn main() -> anyhow::Result<()> {
    app::run_app()
}
