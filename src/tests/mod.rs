use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

mod test_pipe;

pub(crate) fn fifo_path(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!("canmux-{tag}-{}", std::process::id()))
}

/// Writes `text` into the FIFO from a plain thread: the blocking open
/// waits for the reader, a broken pipe is retried, and the write end is
/// held open briefly so a session that raced the open still sees the
/// data on its next pass.
pub(crate) fn write_pipe(path: PathBuf, text: &'static str) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || loop {
        let mut pipe = match std::fs::OpenOptions::new().write(true).open(&path) {
            Ok(pipe) => pipe,
            Err(_) => {
                std::thread::sleep(Duration::from_millis(10));
                continue;
            }
        };
        match pipe.write_all(text.as_bytes()).and_then(|()| pipe.flush()) {
            Ok(()) => {
                std::thread::sleep(Duration::from_millis(200));
                return;
            }
            Err(_) => std::thread::sleep(Duration::from_millis(10)),
        }
    })
}
