use anyhow::Result;

/// All store operations are user-paced and run to completion one at a time, so a current-thread
/// runtime is all the application needs.
pub fn single_thread_runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}
