//! Neon City - procedural night city with an inertial orbit camera

mod config;
mod export;

use anyhow::{Context, Result};
use clap::Parser;
use config::AppConfig;
use engine_core::SceneGraph;
use input::PointerTranslator;
use procgen::{CityLayoutGenerator, NeonSignFactory};
use rand::rngs::StdRng;
use rand::SeedableRng;
use renderer::{LogBackend, SceneAssembler};
use std::path::PathBuf;
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

#[derive(Parser)]
#[command(name = "neon-city", about = "Procedural neon night city with an orbit camera")]
struct Cli {
    /// Config file (defaults to ./config.ron)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// City seed, overrides the config file
    #[arg(short, long)]
    seed: Option<u64>,

    /// Write scene.ron and the glow textures to this directory, then exit
    #[arg(long)]
    export: Option<PathBuf>,
}

/// Application handler for winit.
struct App {
    config: AppConfig,
    /// Generated scene, handed to the assembler once the window exists.
    scene: Option<SceneGraph>,
    window: Option<Arc<Window>>,
    assembler: Option<SceneAssembler>,
    translator: PointerTranslator,
    backend: LogBackend,
}

impl App {
    fn new(config: AppConfig, scene: SceneGraph) -> Self {
        Self {
            config,
            scene: Some(scene),
            window: None,
            assembler: None,
            translator: PointerTranslator::new(),
            backend: LogBackend::new(),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let Some(scene) = self.scene.take() else {
            return;
        };
        let window_attrs = Window::default_attributes()
            .with_title("Neon City")
            .with_inner_size(winit::dpi::LogicalSize::new(self.config.window_width, self.config.window_height));

        let window = match event_loop.create_window(window_attrs) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                log::error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let size = window.inner_size();
        self.assembler = Some(SceneAssembler::new(scene, self.config.camera, (size.width, size.height)));
        window.request_redraw();
        self.window = Some(window);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(assembler) = &mut self.assembler else {
            return;
        };
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput { event: key, .. }
                if key.state == ElementState::Pressed && key.physical_key == PhysicalKey::Code(KeyCode::Escape) =>
            {
                event_loop.exit()
            }
            WindowEvent::RedrawRequested => {
                assembler.frame(&mut self.backend);
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            other => {
                if let Some(pointer) = self.translator.translate(&other) {
                    if assembler.handle(pointer) {
                        log::trace!("Host scroll suppressed for {:?}", pointer);
                    }
                }
            }
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(config::default_config_path);
    let config = AppConfig::load(&config_path);

    let seed = cli.seed.or(config.seed).unwrap_or_else(rand::random);
    log::info!("Starting Neon City (seed {})", seed);

    let mut signs = NeonSignFactory::new(config.glow_style(), config.language);
    let palette = config.palette();
    if !palette.is_empty() {
        signs = signs.with_palette(palette);
    }
    let mut generator = CityLayoutGenerator::new(config.city.clone(), signs);
    let city = generator.generate(&mut StdRng::seed_from_u64(seed));
    let scene = city.to_scene_graph();

    if let Some(dir) = cli.export {
        export::export_city(&dir, &scene, generator.sign_factory().cache())
            .with_context(|| format!("exporting city to {}", dir.display()))?;
        return Ok(());
    }

    let event_loop = EventLoop::new().context("creating event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config, scene);
    event_loop.run_app(&mut app)?;

    Ok(())
}
