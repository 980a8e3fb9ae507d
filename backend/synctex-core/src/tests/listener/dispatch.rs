// Queue hand-off between listener tasks and the editor's UI context

use crate::error::ipc::IpcError;
use crate::listener::{
    DispatchOutcome, NAVIGATION_QUEUE_DEPTH, NavigateToSource, navigation_channel,
};
use crate::session::WindowId;

use std::path::PathBuf;

fn navigation(line: u32) -> NavigateToSource {
    NavigateToSource {
        window_id: WindowId(0x1001),
        path: PathBuf::from("/home/user/thesis/main.tex"),
        line,
    }
}

/// **VALUE**: A full queue drops the newest navigation instead of waiting for room.
///
/// **BUG THIS CATCHES**: Listener tasks parking on a stalled UI thread, each
/// holding a socket open until the editor drains.
#[test]
fn given_full_queue_when_dispatch_then_dropped_and_earlier_navigations_kept() {
    // GIVEN: A queue nobody drains, filled to capacity
    let (dispatcher, mut receiver) = navigation_channel();
    for line in 1..=NAVIGATION_QUEUE_DEPTH as u32 {
        let outcome = dispatcher
            .dispatch(navigation(line))
            .expect("Receiver is alive");
        assert_eq!(outcome, DispatchOutcome::Queued);
    }

    // WHEN: One more navigation arrives
    let outcome = dispatcher
        .dispatch(navigation(999))
        .expect("Receiver is alive");

    // THEN: It is dropped; the queued ones are untouched
    assert_eq!(outcome, DispatchOutcome::Dropped);
    assert_eq!(receiver.try_recv(), Some(navigation(1)));
}

#[test]
fn given_receiver_dropped_when_dispatch_then_send_error() {
    let (dispatcher, receiver) = navigation_channel();
    drop(receiver);

    let result = dispatcher.dispatch(navigation(1));

    assert!(matches!(result, Err(IpcError::Send { .. })));
}
