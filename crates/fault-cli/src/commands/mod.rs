pub mod chain;
pub mod create;
pub mod render;
pub mod schema;
pub mod text;

use crate::cli::{Commands, GlobalFlags};

/// Route a parsed command to its handler.
pub fn dispatch(command: Commands, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Render(args) => render::handle(&args, flags),
        Commands::Text(args) => text::handle(&args),
        Commands::Chain(args) => chain::handle(&args, flags),
        Commands::Create(args) => create::handle(&args, flags),
        Commands::Schema => schema::handle(flags),
    }
}
