use crate::equalize::Equalizer;
use crate::params::PRESETS;
use crate::render::{self, Cell, HUD_ROWS, THEMES};
use crate::sim::{Field, RdSystem};
use crate::Args;
use anyhow::Result;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEventKind},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{
        self, BeginSynchronizedUpdate, DisableLineWrap, EnableLineWrap, EndSynchronizedUpdate,
        EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use rand::{rngs::StdRng, SeedableRng};
use std::io::{self, Stdout, Write};
use std::time::{Duration, Instant};

struct TermGuard {
    out: Stdout,
}

impl TermGuard {
    fn new() -> io::Result<Self> {
        let mut out = io::stdout();
        terminal::enable_raw_mode()?;
        execute!(
            out,
            EnterAlternateScreen,
            DisableLineWrap,
            cursor::Hide,
            cursor::MoveTo(0, 0)
        )?;
        Ok(Self { out })
    }
}

impl Drop for TermGuard {
    fn drop(&mut self) {
        let _ = execute!(
            self.out,
            EndSynchronizedUpdate,
            ResetColor,
            cursor::Show,
            EnableLineWrap,
            LeaveAlternateScreen
        );
        let _ = terminal::disable_raw_mode();
    }
}

pub(crate) fn run(args: &Args) -> Result<()> {
    let mut tg = TermGuard::new()?;
    let mut rng = StdRng::seed_from_u64(args.seed);

    let mut preset_idx = args.preset;
    let mut sys = RdSystem::new(
        args.size,
        PRESETS[preset_idx].p,
        args.scheme,
        args.delta,
        args.substeps,
        &mut rng,
    );
    let mut eq = Equalizer::new();
    let mut shown = Field::A;
    let mut theme_idx = 0usize;
    let mut rows_per_frame = args.rows_per_frame.max(1);
    let mut paused = false;
    let mut lut_mark = 0u64;

    let mut term_size = terminal::size()?;
    let mut cols = term_size.0 as usize;
    let mut render_rows = (term_size.1 as usize).saturating_sub(HUD_ROWS);

    let mut last_frame: Vec<Cell> = vec![Cell::blank(); cols * render_rows];
    let mut cur_frame: Vec<Cell> = Vec::new();

    let mut last_present = Instant::now();
    let mut fps_timer = Instant::now();
    let mut frames: u32 = 0;
    let mut fps: f32 = 0.0;
    let frame_budget = Duration::from_millis(args.ms.max(1));

    loop {
        let now_size = terminal::size()?;
        if now_size != term_size {
            term_size = now_size;
            cols = term_size.0 as usize;
            render_rows = (term_size.1 as usize).saturating_sub(HUD_ROWS);
            last_frame = vec![Cell::blank(); cols * render_rows];
            execute!(
                &mut tg.out,
                terminal::Clear(terminal::ClearType::All),
                cursor::MoveTo(0, 0)
            )?;
        }

        while event::poll(Duration::from_millis(0))? {
            if let Event::Key(k) = event::read()? {
                if k.kind != KeyEventKind::Press {
                    continue;
                }
                match k.code {
                    KeyCode::Char('q') | KeyCode::Char('Q') => return Ok(()),
                    KeyCode::Char(' ') => paused = !paused,
                    KeyCode::Char('a') | KeyCode::Char('A') => {
                        shown = Field::A;
                        eq.rebuild(sys.field(shown), sys.activated_cells());
                    }
                    KeyCode::Char('b') | KeyCode::Char('B') => {
                        shown = Field::B;
                        eq.rebuild(sys.field(shown), sys.activated_cells());
                    }
                    KeyCode::Char('s') | KeyCode::Char('S') => {
                        shown = Field::S;
                        eq.rebuild(sys.field(shown), sys.activated_cells());
                    }
                    KeyCode::Char('r') | KeyCode::Char('R') => {
                        eq.rebuild(sys.field(shown), sys.activated_cells());
                    }
                    KeyCode::Char('k') | KeyCode::Char('K') => {
                        sys.reset(PRESETS[preset_idx].p, &mut rng);
                        eq = Equalizer::new();
                        lut_mark = 0;
                    }
                    KeyCode::Char('p') | KeyCode::Char('P') => {
                        preset_idx = (preset_idx + 1) % PRESETS.len();
                        sys.reset(PRESETS[preset_idx].p, &mut rng);
                        eq = Equalizer::new();
                        lut_mark = 0;
                    }
                    KeyCode::Char('t') | KeyCode::Char('T') => {
                        theme_idx = (theme_idx + 1) % THEMES.len();
                    }
                    KeyCode::Up => rows_per_frame = (rows_per_frame * 2).min(1 << 12),
                    KeyCode::Down => rows_per_frame = (rows_per_frame / 2).max(1),
                    _ => {}
                }
            }
        }

        if !paused {
            sys.advance(rows_per_frame);
        }

        // refresh the tone map every 30 simulation rows
        if sys.generation() >= lut_mark + 30 {
            eq.rebuild(sys.field(shown), sys.activated_cells());
            lut_mark = sys.generation();
        }

        let theme = &THEMES[theme_idx];
        render::compose(&sys, shown, &eq, theme, cols, render_rows, &mut cur_frame);

        let out = &mut tg.out;
        queue!(out, BeginSynchronizedUpdate)?;

        let mut cur_fg = Color::White;
        for ty in 0..render_rows {
            for tx in 0..cols {
                let i = ty * cols + tx;
                let cell = cur_frame[i];
                if last_frame[i] != cell {
                    queue!(out, cursor::MoveTo(tx as u16, (ty + HUD_ROWS) as u16))?;
                    if cell.fg != cur_fg {
                        cur_fg = cell.fg;
                        queue!(out, SetForegroundColor(cur_fg))?;
                    }
                    queue!(out, Print(cell.ch))?;
                    last_frame[i] = cell;
                }
            }
        }

        // HUD (always redrawn, cheap)
        let p = sys.params();
        let line1 = format!(
            "rdscan  preset:{}  field:{}  scheme:{}  gen:{}  rows/frame:{}  theme:{}  fps:{:>5.1}",
            PRESETS[preset_idx].name,
            shown.label(),
            sys.scheme().label(),
            sys.generation(),
            rows_per_frame,
            THEMES[theme_idx].name,
            fps
        );
        let line2 = format!(
            "s:{:.3} dA:{:.3} bA:{:.3} rA:{:.3} dB:{:.3} rB:{:.4} bB:{:.3}  keys: Q quit  SPACE pause  A/B/S field  R remap  K reset  P preset  T theme  Up/Down speed",
            p.s, p.diffuse_a, p.base_a, p.reduce_a, p.diffuse_b, p.reduce_b, p.base_b
        );
        let pad = |s: &str| {
            if s.len() < cols {
                " ".repeat(cols - s.len())
            } else {
                String::new()
            }
        };
        queue!(out, cursor::MoveTo(0, 0), ResetColor)?;
        queue!(out, Print(&line1), Print(pad(&line1)))?;
        queue!(out, cursor::MoveTo(0, 1), Print(&line2), Print(pad(&line2)))?;

        queue!(out, ResetColor, EndSynchronizedUpdate)?;
        out.flush()?;

        frames += 1;
        if fps_timer.elapsed() >= Duration::from_millis(500) {
            fps = frames as f32 / fps_timer.elapsed().as_secs_f32();
            fps_timer = Instant::now();
            frames = 0;
        }

        let elapsed = last_present.elapsed();
        if elapsed < frame_budget {
            std::thread::sleep(frame_budget - elapsed);
        }
        last_present = Instant::now();
    }
}
