use std::path::PathBuf;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};

use super::mode::TuiState;
use crate::shared::{InputEvent, TrackId};

// poll for input from tui, tracks focus + prompt state in tuistate,
// resolves keys to input events for the middle layer to handle
pub fn poll_input(timeout: Duration, ts: &mut TuiState) -> anyhow::Result<Vec<InputEvent>> {
    if !event::poll(timeout)? {
        return Ok(vec![]);
    }

    if let Event::Key(key) = event::read()? {
        if key.kind != KeyEventKind::Press {
            return Ok(vec![]);
        }
        return Ok(handle_key(key.code, ts));
    }
    Ok(vec![])
}

pub fn handle_key(code: KeyCode, ts: &mut TuiState) -> Vec<InputEvent> {
    if ts.prompt.is_some() {
        return handle_prompt_key(code, ts);
    }

    let track = ts.focused;
    match code {
        KeyCode::Esc | KeyCode::Char('q') => vec![InputEvent::Quit],

        // focus
        KeyCode::Tab => { ts.focused = track.other(); vec![] }
        KeyCode::Char('1') => { ts.focused = TrackId(0); vec![] }
        KeyCode::Char('2') => { ts.focused = TrackId(1); vec![] }

        // transport for the focused track
        KeyCode::Char(' ') | KeyCode::Char('p') => vec![InputEvent::Play(track)],
        KeyCode::Char('k') => vec![InputEvent::Pause(track)],
        KeyCode::Char('s') => vec![InputEvent::Stop(track)],

        // volume slider, lowercase = down
        KeyCode::Char('-') => nudge_volume(-ts.volume_step, ts),
        KeyCode::Char('=') | KeyCode::Char('+') => nudge_volume(ts.volume_step, ts),

        // both tracks
        KeyCode::Char('a') => vec![InputEvent::PlayAll],
        KeyCode::Char('x') => vec![InputEvent::StopAll],

        KeyCode::Char('o') => { ts.prompt = Some(String::new()); vec![] }

        _ => vec![],
    }
}

// typing a path: enter loads it into the focused track, esc gives up
fn handle_prompt_key(code: KeyCode, ts: &mut TuiState) -> Vec<InputEvent> {
    let Some(prompt) = ts.prompt.as_mut() else {
        return vec![];
    };
    match code {
        KeyCode::Enter => {
            let typed = ts.prompt.take().unwrap_or_default();
            let path = typed.trim();
            if path.is_empty() {
                return vec![];
            }
            vec![InputEvent::Load(ts.focused, PathBuf::from(path))]
        }
        KeyCode::Esc => { ts.prompt = None; vec![] }
        KeyCode::Backspace => { prompt.pop(); vec![] }
        KeyCode::Char(c) => { prompt.push(c); vec![] }
        _ => vec![],
    }
}

// snap to whole percents so repeated nudges don't drift
fn nudge_volume(delta: f32, ts: &TuiState) -> Vec<InputEvent> {
    let v = ((ts.focused_volume() + delta) * 100.0).round() / 100.0;
    vec![InputEvent::Volume(ts.focused, v.clamp(0.0, 1.0))]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts() -> TuiState {
        let mut ts = TuiState::new(0.05);
        ts.volumes = [0.7, 0.7];
        ts
    }

    #[test]
    fn transport_keys_target_the_focused_track() {
        let mut ts = ts();
        assert_eq!(handle_key(KeyCode::Char(' '), &mut ts), vec![InputEvent::Play(TrackId(0))]);
        assert!(handle_key(KeyCode::Tab, &mut ts).is_empty());
        assert_eq!(handle_key(KeyCode::Char('k'), &mut ts), vec![InputEvent::Pause(TrackId(1))]);
        assert_eq!(handle_key(KeyCode::Char('s'), &mut ts), vec![InputEvent::Stop(TrackId(1))]);
        handle_key(KeyCode::Char('1'), &mut ts);
        assert_eq!(ts.focused, TrackId(0));
        assert_eq!(handle_key(KeyCode::Char('a'), &mut ts), vec![InputEvent::PlayAll]);
        assert_eq!(handle_key(KeyCode::Char('x'), &mut ts), vec![InputEvent::StopAll]);
        assert_eq!(handle_key(KeyCode::Esc, &mut ts), vec![InputEvent::Quit]);
    }

    #[test]
    fn volume_nudges_clamp_and_snap() {
        let mut ts = ts();
        assert_eq!(handle_key(KeyCode::Char('='), &mut ts), vec![InputEvent::Volume(TrackId(0), 0.75)]);
        ts.volumes[0] = 0.98;
        assert_eq!(handle_key(KeyCode::Char('='), &mut ts), vec![InputEvent::Volume(TrackId(0), 1.0)]);
        ts.volumes[0] = 0.02;
        assert_eq!(handle_key(KeyCode::Char('-'), &mut ts), vec![InputEvent::Volume(TrackId(0), 0.0)]);
    }

    #[test]
    fn prompt_collects_a_path_and_loads_it() {
        let mut ts = ts();
        ts.focused = TrackId(1);
        assert!(handle_key(KeyCode::Char('o'), &mut ts).is_empty());
        for c in "a.wavv".chars() {
            // 'q', 's', 'a' etc. are just text while the prompt is open
            assert!(handle_key(KeyCode::Char(c), &mut ts).is_empty());
        }
        handle_key(KeyCode::Backspace, &mut ts);
        assert_eq!(
            handle_key(KeyCode::Enter, &mut ts),
            vec![InputEvent::Load(TrackId(1), PathBuf::from("a.wav"))]
        );
        assert!(ts.prompt.is_none());
    }

    #[test]
    fn esc_cancels_the_prompt_instead_of_quitting() {
        let mut ts = ts();
        handle_key(KeyCode::Char('o'), &mut ts);
        assert!(handle_key(KeyCode::Esc, &mut ts).is_empty());
        assert!(ts.prompt.is_none());
        assert!(handle_key(KeyCode::Enter, &mut ts).is_empty());
    }
}
