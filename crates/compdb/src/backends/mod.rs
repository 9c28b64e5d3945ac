//! Backend implementations for the trees crosscope knows how to index.

mod chromium;
mod ec;
mod platform2;

pub use chromium::ChromiumBackend;
pub use ec::EcBackend;
pub use platform2::Platform2Backend;

use crate::error::{CompdbError, Result};
use crate::exec::CommandRequest;
use crate::generator::GenerateContext;

/// Languages every C++ backend accepts.
pub(crate) fn is_cpp_language(language: &str) -> bool {
    matches!(language, "c" | "cpp" | "objective-c" | "objective-cpp")
}

/// Runs a request through the context's runner, mapping a non-zero exit
/// into [`CompdbError::CommandFailed`]. Cancellation passes through as-is.
pub(crate) async fn run_checked(ctx: &GenerateContext<'_>, request: CommandRequest) -> Result<()> {
    let command = request.display_line();
    let output = ctx.runner.run(request, ctx.cancel).await?;
    if output.success() {
        Ok(())
    } else {
        Err(CompdbError::CommandFailed {
            command,
            status: output.status,
            stderr: output.stderr,
        })
    }
}
