use draft_advisor::error::Res;

use crate::app::App;

type Handler = Box<dyn Fn(&App, &[String]) -> Res<String>>;

/// A REPL command backed by the session.
pub struct Action {
    pub cmd: &'static str,
    pub desc: &'static str,
    /// Name of the free-form argument, when the command takes one.
    pub arg: Option<&'static str>,
    action: Handler,
}

impl Action {
    pub fn new(
        cmd: &'static str,
        desc: &'static str,
        action: impl Fn(&App, &[String]) -> Res<String> + 'static,
    ) -> Self {
        Self {
            cmd,
            desc,
            arg: None,
            action: Box::new(action),
        }
    }

    pub fn with_arg(mut self, name: &'static str) -> Self {
        self.arg = Some(name);
        self
    }

    pub fn invoke(&self, app: &App, args: &[String]) -> Res<String> {
        (self.action)(app, args)
    }
}
