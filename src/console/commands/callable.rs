/// A parsed `kantik` subcommand, ready to run.
///
/// Errors are printed by `main` as `Error: …` with exit code 1.
pub trait CallableTrait {
    fn call(&self) -> Result<(), Box<dyn std::error::Error>>;
}
