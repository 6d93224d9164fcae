//! gymledger main entrypoint.

use gymledger::run;
use gymledger::ui::messages::error;

fn main() {
    if let Err(e) = run() {
        error(format!("Error: {}", e));
        std::process::exit(e.kind().exit_code());
    }
}
