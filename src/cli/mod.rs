pub mod convert;
pub mod rates;
pub mod session;
pub mod setup;
pub mod ui;

use std::future::Future;

/// Awaits `future` while a spinner with `message` is shown on stderr.
pub async fn with_spinner<F, T>(message: &str, future: F) -> T
where
    F: Future<Output = T>,
{
    let pb = ui::new_spinner(message);
    let output = future.await;
    pb.finish_and_clear();
    output
}
