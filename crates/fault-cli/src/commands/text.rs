use crate::cli::TextArgs;
use crate::input;

/// Handle `faultline text`.
pub fn handle(args: &TextArgs) -> anyhow::Result<()> {
    let error = input::load(&args.input)?;
    if args.full {
        println!("{error:#}");
    } else {
        println!("{error}");
    }
    Ok(())
}
