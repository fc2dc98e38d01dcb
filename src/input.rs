use crate::types::Direction;

/// One tick's worth of player signals.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputFrame {
    pub direction: Option<Direction>,
    pub start: bool,
    pub toggle_camera: bool,
}

/// Supplies the engine with input once per tick. Every signal returned is
/// consumed; the next call must not repeat it.
pub trait InputSource {
    fn take_frame(&mut self) -> InputFrame;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputCommand {
    Move(Direction),
    Start,
    ToggleCamera,
}

pub fn parse_command(raw: &str) -> Option<InputCommand> {
    let normalized = raw.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "w" | "arrowup" => Some(InputCommand::Move(Direction::Up)),
        "s" | "arrowdown" => Some(InputCommand::Move(Direction::Down)),
        "a" | "arrowleft" => Some(InputCommand::Move(Direction::Left)),
        "d" | "arrowright" => Some(InputCommand::Move(Direction::Right)),
        "start" | "enter" | "space" | "restart" => Some(InputCommand::Start),
        "camera" | "c" => Some(InputCommand::ToggleCamera),
        other => Direction::parse(other).map(InputCommand::Move),
    }
}

/// Latching buffer between raw input capture and the engine. Later direction
/// requests overwrite earlier ones within the same tick.
#[derive(Clone, Debug, Default)]
pub struct InputQueue {
    pending: InputFrame,
}

impl InputQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_direction(&mut self, dir: Direction) {
        self.pending.direction = Some(dir);
    }

    pub fn request_start(&mut self) {
        self.pending.start = true;
    }

    /// Two toggles within one tick cancel out.
    pub fn request_camera_toggle(&mut self) {
        self.pending.toggle_camera = !self.pending.toggle_camera;
    }

    pub fn apply(&mut self, command: InputCommand) {
        match command {
            InputCommand::Move(dir) => self.request_direction(dir),
            InputCommand::Start => self.request_start(),
            InputCommand::ToggleCamera => self.request_camera_toggle(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pending == InputFrame::default()
    }
}

impl InputSource for InputQueue {
    fn take_frame(&mut self) -> InputFrame {
        std::mem::take(&mut self.pending)
    }
}
