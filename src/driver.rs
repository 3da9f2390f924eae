//! Frame driver
//!
//! Turns a stream of host frame timestamps into session ticks. The browser
//! host calls [`FrameDriver::frame`] from `requestAnimationFrame`; the
//! native runner feeds synthetic timestamps through [`run_headless`].

use crate::Millis;
use crate::sim::Session;

/// Frames used for the rolling FPS estimate
const FPS_WINDOW: usize = 60;

/// Owns a session and the per-frame loop state around it
#[derive(Debug)]
pub struct FrameDriver {
    session: Session,
    running: bool,
    frames: u64,
    frame_times: [Millis; FPS_WINDOW],
    frame_index: usize,
    fps: u32,
}

impl FrameDriver {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            running: false,
            frames: 0,
            frame_times: [0.0; FPS_WINDOW],
            frame_index: 0,
            fps: 0,
        }
    }

    pub fn start(&mut self) {
        if !self.running {
            log::debug!("Frame driver started");
        }
        self.running = true;
    }

    /// Halt the loop. Later frames are ignored until [`start`](Self::start).
    pub fn stop(&mut self) {
        if self.running {
            log::debug!("Frame driver stopped after {} frames", self.frames);
        }
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Handle one host frame at `now`. Returns whether a tick ran.
    pub fn frame(&mut self, now: Millis) -> bool {
        if !self.running {
            return false;
        }
        self.session.tick(now);
        self.frames += 1;
        self.track_fps(now);
        true
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn into_session(self) -> Session {
        self.session
    }

    fn track_fps(&mut self, now: Millis) {
        self.frame_times[self.frame_index] = now;
        self.frame_index = (self.frame_index + 1) % FPS_WINDOW;

        // Oldest sample sits at the slot we are about to overwrite
        let oldest = self.frame_times[self.frame_index];
        if oldest > 0.0 && now > oldest {
            self.fps = ((FPS_WINDOW as Millis - 1.0) * 1000.0 / (now - oldest)).round() as u32;
        }
    }
}

/// Drive `session` for `frames` frames spaced `frame_ms` apart from `start`.
///
/// `before_frame` runs ahead of each tick with the frame timestamp, which is
/// where a scripted host issues its commands. Stops early on game over.
/// Returns the timestamp of the last frame driven.
pub fn run_headless<F>(
    session: &mut Session,
    start: Millis,
    frame_ms: Millis,
    frames: u32,
    mut before_frame: F,
) -> Millis
where
    F: FnMut(&mut Session, Millis),
{
    let mut now = start;
    for i in 0..frames {
        now = start + i as Millis * frame_ms;
        before_frame(session, now);
        session.tick(now);
        if session.is_over() {
            log::debug!("Headless run ended by game over at {:.0}ms", now);
            break;
        }
    }
    now
}
