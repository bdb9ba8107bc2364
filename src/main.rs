mod entry;
mod logger;

use replay_loader::error::AppResult;

fn main() -> AppResult<()> {
    entry::run()
}
