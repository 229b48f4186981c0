mod app;
mod gpu;

use std::path::PathBuf;

use winit::event_loop::{ControlFlow, EventLoop};

use app::App;
use edge_waves::AppError;

fn main() -> Result<(), AppError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // edge-waves [IMAGE]
    let image_path = std::env::args().nth(1).map(PathBuf::from);

    let event_loop = EventLoop::new()?;
    // Redraws drive the animation; nothing to do between them
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(image_path);
    event_loop.run_app(&mut app)?;

    match app.take_error() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
