/// Process-wide access point to the active renderer and the log sink
///
/// Command buffers are plain values and can be recorded anywhere; submitting one needs
/// the renderer, which lives here behind an `Arc<Mutex<dyn Renderer>>` so any thread
/// can take it for the duration of a submission.

use std::sync::{Arc, Mutex, OnceLock, RwLock};
use std::time::SystemTime;

use crate::error::{Error, Result};
use crate::log::{DefaultLogger, LogEntry, LogSeverity, Logger};
use crate::renderer::Renderer;

const LOG_SOURCE: &str = "rhi::Engine";

type SharedRenderer = Arc<Mutex<dyn Renderer>>;

static ENGINE_STATE: OnceLock<EngineState> = OnceLock::new();

static LOGGER: OnceLock<RwLock<Box<dyn Logger>>> = OnceLock::new();

struct EngineState {
    /// Empty until `create_renderer`, and again after `destroy_renderer`/`shutdown`
    renderer: RwLock<Option<SharedRenderer>>,
}

fn logger() -> &'static RwLock<Box<dyn Logger>> {
    LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)))
}

/// Static facade over the renderer slot and the logger
///
/// ```no_run
/// use rhi_engine::rhi::{CommandBuffer, Engine, RendererConfig};
/// use rhi_engine::rhi::command::Draw;
/// use rhi_engine_renderer_direct3d10::Direct3D10Renderer;
///
/// Engine::initialize()?;
/// Engine::create_renderer(Direct3D10Renderer::new(RendererConfig::default())?)?;
///
/// let mut frame = CommandBuffer::new();
/// Draw::create(&mut frame, 3, 1, 0, 0);
/// if let Ok(mut renderer) = Engine::renderer()?.lock() {
///     frame.submit(&mut *renderer);
/// }
///
/// Engine::shutdown();
/// # Ok::<(), rhi_engine::rhi::Error>(())
/// ```
pub struct Engine;

impl Engine {
    /// Log `error` under the engine source and hand it back
    fn logged(error: Error) -> Error {
        crate::engine_error!(LOG_SOURCE, "{}", error);
        error
    }

    fn state() -> Result<&'static EngineState> {
        ENGINE_STATE.get().ok_or_else(|| {
            Self::logged(Error::InitializationFailed(
                "Engine not initialized. Call Engine::initialize() first.".to_string(),
            ))
        })
    }

    fn poisoned() -> Error {
        Self::logged(Error::BackendError("Renderer slot lock poisoned".to_string()))
    }

    /// Set up the renderer slot; later calls do nothing
    pub fn initialize() -> Result<()> {
        ENGINE_STATE.get_or_init(|| EngineState {
            renderer: RwLock::new(None),
        });
        Ok(())
    }

    /// Empty the renderer slot
    ///
    /// Never fails: an uninitialized engine or a poisoned slot is left as is.
    /// Callers still holding an `Arc` from `renderer()` keep the renderer alive.
    pub fn shutdown() {
        if let Some(state) = ENGINE_STATE.get() {
            if let Ok(mut slot) = state.renderer.write() {
                *slot = None;
            }
        }
    }

    /// Move `renderer` into the empty slot
    ///
    /// # Errors
    ///
    /// `InitializationFailed` before `initialize` or while another renderer occupies
    /// the slot, `BackendError` if the slot lock is poisoned.
    pub fn create_renderer<R: Renderer + 'static>(renderer: R) -> Result<()> {
        let name = renderer.name();
        let renderer_id = renderer.renderer_id();

        let mut slot = Self::state()?.renderer.write().map_err(|_| Self::poisoned())?;
        if slot.is_some() {
            return Err(Self::logged(Error::InitializationFailed(
                "A renderer already exists. Call Engine::destroy_renderer() first.".to_string(),
            )));
        }
        *slot = Some(Arc::new(Mutex::new(renderer)));

        crate::engine_info!(LOG_SOURCE, "Renderer created ({} backend, id {})", name, renderer_id);
        Ok(())
    }

    /// Shared handle on the current renderer
    ///
    /// # Errors
    ///
    /// `InitializationFailed` before `initialize` or when the slot is empty.
    pub fn renderer() -> Result<SharedRenderer> {
        let slot = Self::state()?.renderer.read().map_err(|_| Self::poisoned())?;
        slot.clone().ok_or_else(|| {
            Self::logged(Error::InitializationFailed(
                "Renderer not created. Call Engine::create_renderer() first.".to_string(),
            ))
        })
    }

    /// Empty the slot so another renderer can be created
    pub fn destroy_renderer() -> Result<()> {
        let mut slot = Self::state()?.renderer.write().map_err(|_| Self::poisoned())?;
        if slot.take().is_some() {
            crate::engine_info!(LOG_SOURCE, "Renderer destroyed");
        }
        Ok(())
    }

    // ===== LOGGING =====

    /// Route every later log entry to `logger`
    ///
    /// ```no_run
    /// use rhi_engine::rhi::{Engine, log::MemoryLogger};
    ///
    /// let captured = MemoryLogger::new();
    /// Engine::set_logger(captured.clone());
    /// ```
    pub fn set_logger<L: Logger + 'static>(logger: L) {
        if let Ok(mut current) = self::logger().write() {
            *current = Box::new(logger);
        }
    }

    /// Go back to colored console output
    pub fn reset_logger() {
        Self::set_logger(DefaultLogger);
    }

    /// Sink of `engine_trace!` through `engine_warn!`
    pub fn log(severity: LogSeverity, source: &str, message: String) {
        Self::emit(severity, source, message, None);
    }

    /// Sink of `engine_error!`, which adds the call site
    pub fn log_detailed(severity: LogSeverity, source: &str, message: String, file: &'static str, line: u32) {
        Self::emit(severity, source, message, Some((file, line)));
    }

    fn emit(severity: LogSeverity, source: &str, message: String, location: Option<(&'static str, u32)>) {
        if let Ok(logger) = logger().read() {
            logger.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: location.map(|(file, _)| file),
                line: location.map(|(_, line)| line),
            });
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
