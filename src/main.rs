use std::cell::RefCell;
use std::collections::HashMap;
use std::error::Error;
use std::ffi::{c_int, c_void};
use std::fmt::Display;
use std::ptr;

use anyhow::Context;
use glam::Vec3;
use log::{error, info, warn};
use sdl2::event::{Event, WindowEvent};
use sdl2::keyboard::Keycode;
use sdl2::sys::{SDL_Event, SDL_EventType};
use sdl2::video::{GLProfile, Window};
use sdl2::EventPump;

use wibble::config::Config;
use wibble::input::dom_key_code;
use wibble::renderer::GlContext;
use wibble::transport::PlatformTransport;
use wibble::{Geometry, Node, Optics, Scene, Session};

fn main() -> anyhow::Result<()> {
    if let Err(err) = env_logger::try_init() {
        println!("Warning: Could not initialize logger: {err}");
    }
    let config = Config::load();

    let sdl_context = sdl2::init().map_err(SdlErr)?;
    let video_subsystem = sdl_context.video().map_err(SdlErr)?;
    let gl_attr = video_subsystem.gl_attr();
    gl_attr.set_context_profile(GLProfile::GLES);
    gl_attr.set_context_version(3, 0);
    // Linear->SRGB conversion is done in shader, thanks to lacking WebGL support.
    gl_attr.set_framebuffer_srgb_compatible(false);
    let window = video_subsystem
        .window(&config.window.title, config.window.width, config.window.height)
        .resizable()
        .opengl()
        .build()?;
    let gl_context = window.gl_create_context().map_err(SdlErr)?;
    let event_pump = sdl_context.event_pump().map_err(SdlErr)?;

    // Set up an event filter to avoid too eager preventDefault()s on
    // emscripten: only keys the server understands are taken from the page.
    extern "C" fn event_filter(_: *mut c_void, event: *mut SDL_Event) -> c_int {
        const DROPPED: c_int = 0;
        const ACCEPTED: c_int = 1;
        if let Some(event) = unsafe { event.as_ref() } {
            const KEYDOWN: u32 = SDL_EventType::SDL_KEYDOWN as u32;
            const KEYUP: u32 = SDL_EventType::SDL_KEYUP as u32;
            match unsafe { event.type_ } {
                KEYDOWN | KEYUP => {
                    let key_event = unsafe { event.key };
                    if dom_key_code(key_event.keysym.sym).is_some() {
                        ACCEPTED
                    } else {
                        DROPPED
                    }
                }
                _ => ACCEPTED,
            }
        } else {
            ACCEPTED
        }
    }
    unsafe { sdl2::sys::SDL_SetEventFilter(Some(event_filter), ptr::null_mut()) };

    if let Err(err) = video_subsystem.gl_set_swap_interval(1) {
        warn!("could not enable vsync: {err}");
    }
    let (width, height) = window.drawable_size();
    let context = GlContext::new(
        |s| video_subsystem.gl_get_proc_address(s) as *const c_void,
        width as i32,
        height as i32,
    )?;
    let scene = build_scene(Scene::new(context), &config)?;
    info!("exchanging state with {}", config.exchange_url());
    let transport = PlatformTransport::new(&config.server.url);
    let session = Session::new(scene, transport, &config.server.endpoint);

    STATE.with(|state| {
        *state.borrow_mut() = Some(State {
            session,
            event_pump,
            _gl_context: gl_context,
            window,
        })
    });

    #[cfg(target_family = "wasm")]
    wibble::emscripten_h::set_main_loop(run_frame);
    #[cfg(not(target_family = "wasm"))]
    loop {
        run_frame()
    }
}

/// A camera looking at a single triangle, which is all the server-driven
/// game needs to start from.
fn build_scene(
    mut scene: Scene<GlContext>,
    config: &Config,
) -> anyhow::Result<Scene<GlContext>> {
    scene.set_clear_color(config.clear_color);

    #[rustfmt::skip]
    let vertices = vec![
        -1.0, -1.0, 0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0,
        -1.0,  1.0, 0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0,
         1.0, -1.0, 0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0,
    ];
    let geometry = Geometry::position_normal_color(vertices, vec![0, 1, 2])?;
    let components = vec![scene.create_geometry(geometry)];

    let shader_source = std::fs::read_to_string(&config.shader_path)
        .with_context(|| format!("could not read shader {}", config.shader_path))?;
    let material = scene
        .create_material(&shader_source, HashMap::new())
        .with_context(|| format!("could not build shader {}", config.shader_path))?;

    let camera = &config.camera;
    let optics = Optics::new(camera.yfov, camera.znear, camera.zfar)?;
    let camera = scene.insert(
        "camera",
        Node::camera(optics).translated(Vec3::from(camera.position)),
    );
    scene.insert("molecule", Node::drawable(components, material));
    scene.set_active_camera(camera)?;
    Ok(scene)
}

thread_local! {
    static STATE: RefCell<Option<State>> = const { RefCell::new(None) };
}

// Fields drop in order, so the session releases its GL objects while the
// GL context is still alive.
struct State {
    session: Session<GlContext, PlatformTransport>,
    event_pump: EventPump,
    _gl_context: sdl2::video::GLContext,
    window: Window,
}

impl State {
    /// Returns false once the window has been asked to close.
    fn run_frame(&mut self) -> bool {
        let State {
            window,
            event_pump,
            session,
            ..
        } = self;

        for event in event_pump.poll_iter() {
            match event {
                Event::Quit { .. } => return false,
                Event::Window {
                    win_event: WindowEvent::Resized(w, h),
                    ..
                } => session.scene_mut().context_mut().resize(w, h),
                Event::KeyDown {
                    keycode: Some(keycode),
                    ..
                } => {
                    if let Some(code) = key_code(keycode) {
                        session.scene_mut().key_down(code);
                    }
                }
                Event::KeyUp {
                    keycode: Some(keycode),
                    ..
                } => {
                    if let Some(code) = key_code(keycode) {
                        session.scene_mut().key_up(code);
                    }
                }
                _ => {}
            }
        }

        if let Err(err) = session.frame() {
            error!("skipping frame: {err}");
        }
        window.gl_swap_window();
        true
    }
}

fn key_code(keycode: Keycode) -> Option<u32> {
    dom_key_code(keycode as i32)
}

extern "C" fn run_frame() {
    let running = STATE.with(|state| match state.borrow_mut().as_mut() {
        Some(state) => state.run_frame(),
        None => true,
    });
    if !running {
        // process::exit skips destructors, so release the GL objects and
        // the transport thread first.
        STATE.with(|state| drop(state.borrow_mut().take()));
        info!("shutting down");
        std::process::exit(0);
    }
}

#[derive(Debug)]
pub struct SdlErr(String);
impl Display for SdlErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sdl error: {}", self.0)
    }
}
impl Error for SdlErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        None
    }
}
