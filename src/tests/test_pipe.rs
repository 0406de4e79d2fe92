use std::os::unix::fs::FileTypeExt;
use std::time::Duration;

use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use super::{fifo_path, write_pipe};
use crate::command::CommandQueue;
use crate::pipe::CommandPipe;

const WAIT: Duration = Duration::from_secs(2);

#[tokio::test]
async fn recovers_from_writer_absence_and_delivers_once() {
    let path = fifo_path("pipe-recover");
    let _ = std::fs::remove_file(&path);

    let (queue, mut consumer) = CommandQueue::channel();
    let source = CommandPipe::new(path.clone(), queue, Duration::from_millis(20));
    let cancel = CancellationToken::new();
    let task = tokio::spawn(source.run(cancel.clone()));

    // Several retry cycles with no writer at all.
    tokio::time::sleep(Duration::from_millis(100)).await;
    let created = std::fs::metadata(&path).unwrap();
    assert!(created.file_type().is_fifo());

    let writer = write_pipe(path.clone(), "send 0x300 1 2\n");

    let command = timeout(WAIT, consumer.next()).await.unwrap().unwrap();
    assert_eq!(command.text(), "send 0x300 1 2");
    // Exactly once: nothing duplicated on the reopen cycles.
    assert!(timeout(Duration::from_millis(150), consumer.next())
        .await
        .is_err());

    writer.join().unwrap();
    cancel.cancel();
    timeout(WAIT, task).await.unwrap().unwrap();
    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn skips_blank_lines_and_trims_text() {
    let path = fifo_path("pipe-blank");
    let _ = std::fs::remove_file(&path);

    let (queue, mut consumer) = CommandQueue::channel();
    let source = CommandPipe::new(path.clone(), queue, Duration::from_millis(20));
    let cancel = CancellationToken::new();
    let task = tokio::spawn(source.run(cancel.clone()));

    let writer = write_pipe(path.clone(), "  \n\n  send 0x1 1 2  \n");

    let command = timeout(WAIT, consumer.next()).await.unwrap().unwrap();
    assert_eq!(command.text(), "send 0x1 1 2");
    assert!(timeout(Duration::from_millis(150), consumer.next())
        .await
        .is_err());

    writer.join().unwrap();
    cancel.cancel();
    timeout(WAIT, task).await.unwrap().unwrap();
    let _ = std::fs::remove_file(&path);
}
