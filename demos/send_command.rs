use std::env;
use std::fs::OpenOptions;
use std::io::Write;

/// Writes one command line into the responder's named pipe, e.g.
/// `send_command send 0x200 7 6`. Blocks until a reader has the pipe
/// open.
fn main() -> std::io::Result<()> {
    let tokens: Vec<String> = env::args().skip(1).collect();
    if tokens.is_empty() {
        eprintln!("usage: send_command <command token>...");
        std::process::exit(2);
    }
    let mut pipe = OpenOptions::new().write(true).open("/tmp/can_commands")?;
    writeln!(pipe, "{}", tokens.join(" "))
}
