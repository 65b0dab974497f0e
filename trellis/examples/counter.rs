use std::cell::RefCell;
use std::error::Error;
use std::fs::File;
use std::io::{self, Write};
use std::rc::Rc;

use crossterm::event::{self, Event as TermEvent, KeyCode, KeyEventKind};
use crossterm::{cursor, execute, terminal};
use simplelog::{Config, LevelFilter, WriteLogger};
use trellis::prelude::*;
use trellis_dom::interact::click;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Up,
    Down,
    Reset,
}

fn view(count: &i64, emit: &Emitter<Step>, _: &Navigator) -> Node {
    let button = |class: &str, label: &str, step: Step| {
        let emit = emit.clone();
        let command = class.to_string();
        Element::new("button")
            .class(class)
            .on("click", move |_: &Event| emit.emit(&command, step))
            .child(label)
    };

    Element::new("main")
        .class("counter")
        .child(Element::new("h1").child(format!("Count: {count}")))
        .child(button("increment", "+", Step::Up))
        .child(button("decrement", "-", Step::Down))
        .child((*count != 0).then(|| button("reset", "reset", Step::Reset)))
        .into()
}

fn step(count: &i64, step: &Step) -> i64 {
    match step {
        Step::Up => count + 1,
        Step::Down => count - 1,
        Step::Reset => 0,
    }
}

fn draw(doc: &Document, root: NodeId) -> io::Result<()> {
    let mut out = io::stdout();
    execute!(out, terminal::Clear(terminal::ClearType::All), cursor::MoveTo(0, 0))?;
    write!(out, "{}\r\n\r\n", doc.text_content(root))?;
    write!(out, "{}\r\n\r\n", doc.inner_html(root))?;
    write!(out, "+/- to change, r to reset, q to quit\r\n")?;
    out.flush()
}

fn main() -> Result<(), Box<dyn Error>> {
    let log_file = File::create("counter.log")?;
    WriteLogger::init(LevelFilter::Debug, Config::default(), log_file)?;

    let doc = Rc::new(RefCell::new(Document::new()));
    let root = {
        let mut d = doc.borrow_mut();
        let body = d.body();
        let root = d.create_element("div");
        d.append_child(body, root)?;
        root
    };

    let app = AppBuilder::new(0_i64, view)
        .reducer("increment", step)
        .reducer("decrement", step)
        .reducer("reset", step)
        .config(AppConfig::new("counter"))
        .on_error(|e| log::error!("{e}"))
        .build(doc.clone());
    app.mount(root)?;

    terminal::enable_raw_mode()?;
    let result = run(&doc, root);
    terminal::disable_raw_mode()?;

    app.unmount();
    result
}

fn run(doc: &Rc<RefCell<Document>>, root: NodeId) -> Result<(), Box<dyn Error>> {
    loop {
        draw(&doc.borrow(), root)?;

        let TermEvent::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        let class = match key.code {
            KeyCode::Char('+') => "increment",
            KeyCode::Char('-') => "decrement",
            KeyCode::Char('r') => "reset",
            KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
            _ => continue,
        };
        let target = doc.borrow().find_by_class(root, class);
        if let Some(button) = target {
            click(doc, button)?;
        }
        let applied = doc.borrow_mut().take_mutations();
        log::debug!(
            "{class}: {} mutations, {} structural",
            applied.len(),
            applied.iter().filter(|m| m.is_structural()).count()
        );
    }
}
