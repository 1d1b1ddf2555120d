use vergen::EmitBuilder;

// Emits VERGEN_* build and git variables for the start-up banner.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    EmitBuilder::builder().all_build().all_git().emit()?;
    Ok(())
}
