//! Mob Survivor headless runner
//!
//! Plays a session with a simple autopilot and prints the final snapshot
//! as JSON. Usage: `mob-survivor [settings.json] [seconds]`.
//! The browser build enters through `web::WebSession` instead.

#[cfg(not(target_arch = "wasm32"))]
mod autopilot {
    use glam::Vec2;
    use mob_survivor::GameMode;
    use mob_survivor::sim::{AbilityKind, Session, combat};

    /// Distance the autopilot tries to keep from the nearest threat
    const KITE_DISTANCE: f32 = 180.0;

    /// Issue this frame's commands
    pub fn drive(session: &mut Session) {
        match session.settings().mode {
            GameMode::Survival => survive(session),
            GameMode::Dodge => dodge(session),
        }
    }

    fn survive(session: &mut Session) {
        if !session.state().wave.active {
            session.start_next_wave();
        }
        for kind in session.unlockable_now() {
            session.unlock_ability(kind);
        }

        let state = session.state();
        let player_pos = state.player.pos;
        let Some(threat) = combat::nearest_live_mob(&state.mobs, player_pos)
            .and_then(|id| state.mobs.get(id))
            .map(|mob| mob.pos)
        else {
            return;
        };

        let away = mob_survivor::direction_to(threat, player_pos).unwrap_or(Vec2::Y);
        let close = threat.distance(player_pos) < KITE_DISTANCE;
        if close {
            // Slide sideways as well so the player does not pin itself in a corner
            let retreat = player_pos + (away + away.perp() * 0.5) * KITE_DISTANCE;
            session.set_move_target(retreat);
            session.activate_ability(AbilityKind::Shield);
            session.activate_ability(AbilityKind::Dash);
        }

        session.activate_ability(AbilityKind::Lightning);
        session.activate_ability(AbilityKind::Fireball);
        session.activate_ability(AbilityKind::BasicAttack);
    }

    fn dodge(session: &mut Session) {
        let state = session.state();
        let player = &state.player;
        let incoming = state
            .skillshots
            .iter()
            .filter(|shot| !shot.is_casting())
            .filter(|shot| (player.pos - shot.pos).dot(shot.vel) > 0.0)
            .min_by(|a, b| {
                a.pos
                    .distance_squared(player.pos)
                    .total_cmp(&b.pos.distance_squared(player.pos))
            });
        let Some(shot) = incoming else {
            let centre = state.bounds * 0.5;
            if player.move_target.is_none() {
                session.set_move_target(centre);
            }
            return;
        };

        // Step off the shot's line on whichever side the player already leans
        let heading = shot.vel.normalize_or_zero();
        let side = heading.perp();
        let lean = (player.pos - shot.pos).dot(side);
        let step = if lean >= 0.0 { side } else { -side };
        let target = player.pos + step * (shot.radius() + player.radius + 20.0);
        session.set_move_target(target);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use mob_survivor::{FrameDriver, Session, Settings, run_headless};

    mob_survivor::init_logging();
    log::info!("Mob Survivor (headless) starting...");

    let mut args = std::env::args().skip(1);
    let settings = match args.next() {
        Some(path) => match Settings::load_from_path(&path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Could not load {}: {}; using defaults", path, e);
                Settings::default()
            }
        },
        None => Settings::default(),
    };
    let seconds: f64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(120.0);

    const FRAME_MS: f64 = 1000.0 / 60.0;
    let frames = (seconds * 1000.0 / FRAME_MS).ceil() as u32;

    let mut driver = FrameDriver::new(Session::new(settings));
    driver.start();
    let last = run_headless(driver.session_mut(), 0.0, FRAME_MS, frames, |session, now| {
        for event in session.drain_events() {
            log::debug!("[{:.0}ms] {:?}", now, event);
        }
        autopilot::drive(session);
    });
    driver.stop();

    let session = driver.into_session();
    let snapshot = session.snapshot();
    log::info!(
        "Finished at {:.1}s: wave {}, level {}, {} kills, {} dodged, health {:.0}",
        last / 1000.0,
        snapshot.wave.number,
        snapshot.player.level,
        snapshot.player.kills,
        snapshot.dodged,
        snapshot.player.health
    );

    match snapshot.to_json() {
        Ok(json) => println!("{json}"),
        Err(e) => {
            log::error!("Failed to serialize snapshot: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is web::WebSession, this is just to satisfy the compiler
}
