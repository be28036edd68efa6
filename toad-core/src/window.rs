//! SDL2 window and main loop.
//! Every update goes to the `App`; every render uploads its frame buffer as an
//! OpenGL texture and scales it to the window.
use graphics::Transformed;
use image::RgbaImage;
use opengl_graphics::{
    CreateTexture, Filter, Format, GlGraphics, Texture, TextureSettings, UpdateTexture,
};
use piston::event_loop::{EventLoop, EventSettings, Events};
use piston::input::{Event, Input, Loop, RenderArgs};
use piston::window::WindowSettings;
use sdl2_window::Sdl2Window;
use tuple_map::*;

use crate::app::{App, AppMessage};
use crate::error::{Result, ToadError};
use crate::input::InputHandler;
use crate::setting::ToadSetting;
use crate::Clock;

fn window_error(message: impl ToString) -> ToadError {
    ToadError::Window {
        message: message.to_string(),
    }
}

struct Frontend {
    gl: GlGraphics,
    /// created on the first render
    texture: Option<Texture>,
    /// buffer size in pixels
    buf_size: (u32, u32),
    /// window pixels / buffer pixels
    scale: (f64, f64),
    upd_count: Clock,
    input_handle: InputHandler,
}

impl Frontend {
    fn get_scale(buf_size: (u32, u32), window: (f64, f64)) -> (f64, f64) {
        let (bw, bh) = buf_size.map(f64::from);
        (window.0 / bw, window.1 / bh)
    }
    fn new(setting: &ToadSetting) -> Frontend {
        let buf_size = setting.pixel_size();
        let window = setting.window_size().map(f64::from);
        Frontend {
            gl: GlGraphics::new(setting.opengl),
            texture: None,
            buf_size,
            scale: Self::get_scale(buf_size, window),
            upd_count: 0,
            input_handle: InputHandler::default(),
        }
    }
    fn upload(&mut self, buf: &RgbaImage) -> Result<()> {
        let size = [buf.width(), buf.height()];
        match &mut self.texture {
            // Texture has an inherent `update` taking its own image type
            Some(t) => UpdateTexture::update(t, &mut (), Format::Rgba8, buf.as_raw(), [0, 0], size)
                .map_err(window_error),
            None => {
                let setting = TextureSettings::new().filter(Filter::Nearest);
                let t = <Texture as CreateTexture<()>>::create(
                    &mut (),
                    Format::Rgba8,
                    buf.as_raw(),
                    size,
                    &setting,
                )
                .map_err(window_error)?;
                self.texture = Some(t);
                Ok(())
            }
        }
    }
    fn render(&mut self, args: &RenderArgs) {
        let texture = match &self.texture {
            Some(t) => t,
            None => return,
        };
        let (xs, ys) = self.scale;
        self.gl.draw(args.viewport(), |ctx, gl| {
            graphics::clear([0.0, 0.0, 0.0, 1.0], gl);
            let trans = ctx.transform.scale(xs, ys);
            graphics::image(texture, trans, gl);
        });
    }
    /// Returns false when the game should end.
    fn handle_event(&mut self, event: Event, app: &mut impl App) -> Result<bool> {
        match event {
            Event::Input(input, _) => match input {
                Input::Resize(args) => {
                    let [w, h] = args.window_size;
                    self.scale = Self::get_scale(self.buf_size, (w, h));
                    debug!("resized to {}x{}, scale {:?}", w, h, self.scale);
                }
                Input::Close(_) => return Ok(false),
                _ => self.input_handle.handle(&input, self.upd_count),
            },
            Event::Loop(Loop::Update(_)) => {
                self.upd_count += 1;
                let msg = self.input_handle.get_message(self.upd_count);
                if app.update(&msg) == AppMessage::Quit {
                    return Ok(false);
                }
            }
            Event::Loop(Loop::Render(args)) => {
                self.upload(app.paint())?;
                self.render(&args);
            }
            _ => {}
        }
        Ok(true)
    }
}

/// Open a window and run `app` until it quits or the window is closed.
pub fn run(app: &mut impl App, setting: &ToadSetting) -> Result<()> {
    let (w, h) = setting.window_size();
    let mut window: Sdl2Window = WindowSettings::new(setting.title.clone(), [w, h])
        .graphics_api(setting.opengl)
        .exit_on_esc(false)
        .srgb(false)
        .vsync(true)
        .resizable(setting.resizable)
        .build()
        .map_err(window_error)?;
    let event_setting = EventSettings::new()
        .max_fps(setting.max_fps)
        .ups(setting.ups);
    let mut events = Events::new(event_setting);
    let mut frontend = Frontend::new(setting);
    info!("{}: {}x{} window", app.name(), w, h);
    while let Some(event) = events.next(&mut window) {
        if !frontend.handle_event(event, app)? {
            break;
        }
    }
    info!("{}: bye", app.name());
    Ok(())
}
