use crate::shared::{DisplayState, TrackId, TrackState, TrackView};
use crate::tui::mode::TuiState;
use crate::tui::waveform::draw_waveform;
use ratatui::layout::{Layout, Direction, Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph};
use ratatui::Frame;

const HELP: &str = "tab/1/2 focus  space play  k pause  s stop  -/= vol  a all  x stop all  o open  q quit";

pub fn render(frame: &mut Frame, area: Rect, state: &DisplayState, ts: &TuiState) {
   let sections = Layout::default()
       .direction(Direction::Vertical)
       .constraints([
           Constraint::Min(7), // track 1
           Constraint::Min(7), // track 2
           Constraint::Length(3), // status / prompt
       ])
       .split(area);

   for track in TrackId::ALL {
       draw_track(frame, sections[track.index()], state.track(track), ts.focused == track);
   }
   draw_footer(frame, sections[2], state, ts);
}

fn draw_track(frame: &mut Frame, area: Rect, view: &TrackView, focused: bool) {
   let border = if focused {
       Style::default().fg(Color::Yellow)
   } else {
       Style::default().fg(Color::DarkGray)
   };
   let title = match &view.file_name {
       Some(name) => format!(" {}: {} ", view.label, name),
       None => format!(" {}: no file ", view.label),
   };
   let block = Block::default()
       .borders(Borders::ALL)
       .border_style(border)
       .title(title);
   let inner = block.inner(area);
   frame.render_widget(block, area);

   let rows = Layout::default()
       .direction(Direction::Vertical)
       .constraints([
           Constraint::Length(1), // state + volume
           Constraint::Min(1), // waveform
           Constraint::Length(1), // progress
       ])
       .split(inner);

   frame.render_widget(Paragraph::new(header_line(view)), rows[0]);

   let progress = (view.duration_secs > 0.0).then(|| view.position_secs / view.duration_secs);
   draw_waveform(frame, rows[1], &view.peaks, progress);

   let gauge = Gauge::default()
       .gauge_style(Style::default().fg(Color::Cyan).bg(Color::Black))
       .percent(u16::from(view.progress_percent.min(100)))
       .label(view.time_label.clone());
   frame.render_widget(gauge, rows[2]);
}

fn header_line(view: &TrackView) -> Line<'static> {
   let state_color = match view.state {
       TrackState::Playing => Color::Green,
       TrackState::Paused => Color::Yellow,
       TrackState::Empty => Color::DarkGray,
       TrackState::Ready | TrackState::Stopped => Color::White,
   };
   let mut spans = vec![
       Span::styled(
           format!("{:<8}", view.state.label()),
           Style::default().fg(state_color).add_modifier(Modifier::BOLD),
       ),
       Span::raw(format!("  vol {:>3}%", (view.volume * 100.0).round() as u32)),
   ];
   if view.loading {
       spans.push(Span::styled("  loading...", Style::default().fg(Color::Magenta)));
   }
   if view.sample_rate > 0 {
       spans.push(Span::styled(
           format!("  {} Hz", view.sample_rate),
           Style::default().fg(Color::DarkGray),
       ));
   }
   Line::from(spans)
}

fn draw_footer(frame: &mut Frame, area: Rect, state: &DisplayState, ts: &TuiState) {
   let block = Block::default().borders(Borders::ALL);
   let text = match &ts.prompt {
       Some(typed) => Line::from(vec![
           Span::styled(
               format!("open into {}: ", ts.focused),
               Style::default().fg(Color::Yellow),
           ),
           Span::raw(format!("{typed}_")),
       ]),
       None => Line::from(vec![
           Span::raw(state.status.clone()),
           Span::styled(format!("   [{HELP}]"), Style::default().fg(Color::DarkGray)),
       ]),
   };
   frame.render_widget(Paragraph::new(text).block(block), area);
}
