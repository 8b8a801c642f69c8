use lumen_common::Color;
use std::fmt;

/// Errors from panel operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PanelError {
    #[error("no control named {0:?}")]
    UnknownControl(String),
    #[error("control {0:?} already exists")]
    DuplicateControl(String),
    #[error("control {name:?} expects a {expected}")]
    TypeMismatch { name: String, expected: &'static str },
    #[error("{name}: {value} outside {min}..={max}")]
    OutOfRange { name: String, value: f32, min: f32, max: f32 },
    #[error("{name}: {value:?} is not one of the options")]
    UnknownChoice { name: String, value: String },
    #[error("{name}: cannot parse {text:?}")]
    Unparsable { name: String, text: String },
    #[error("{name}: rejected: {reason}")]
    Rejected { name: String, reason: String },
}

/// Kind of a bound field and its constraints.
#[derive(Debug, Clone, PartialEq)]
pub enum Control {
    /// Written values are checked against `min..=max` and snapped to `step`.
    Number { min: f32, max: f32, step: f32 },
    Color,
    Choice(Vec<&'static str>),
    Toggle,
}

impl Control {
    fn expected(&self) -> &'static str {
        match self {
            Self::Number { .. } => "number",
            Self::Color => "color",
            Self::Choice(_) => "choice",
            Self::Toggle => "toggle",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PanelValue {
    Number(f32),
    Color(Color),
    Choice(String),
    Toggle(bool),
}

impl fmt::Display for PanelValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(v) => write!(f, "{v}"),
            Self::Color(c) => write!(f, "{c}"),
            Self::Choice(s) => f.write_str(s),
            Self::Toggle(b) => write!(f, "{b}"),
        }
    }
}

type Getter<S> = Box<dyn Fn(&S) -> PanelValue>;
type Setter<S> = Box<dyn FnMut(&mut S, &PanelValue) -> Result<(), String>>;
type Callback<S> = Box<dyn FnMut(&mut S, &PanelValue)>;

struct Binding<S> {
    name: String,
    control: Control,
    get: Getter<S>,
    set: Setter<S>,
    on_change: Vec<Callback<S>>,
}

/// Named, validated read/write access to fields of some state `S`.
///
/// Bindings are closures over `&S` / `&mut S`, so the same panel can be
/// driven against whatever struct owns the values (config, scene, renderer
/// settings). No widgets are drawn; hosts list `controls()` and call `set`.
pub struct DebugPanel<S> {
    title: String,
    bindings: Vec<Binding<S>>,
}

impl<S> fmt::Debug for DebugPanel<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebugPanel")
            .field("title", &self.title)
            .field("controls", &self.bindings.iter().map(|b| &b.name).collect::<Vec<_>>())
            .finish()
    }
}

impl<S> DebugPanel<S> {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            bindings: Vec::new(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn controls(&self) -> impl Iterator<Item = (&str, &Control)> {
        self.bindings.iter().map(|b| (b.name.as_str(), &b.control))
    }

    fn push(&mut self, binding: Binding<S>) -> Result<(), PanelError> {
        if self.bindings.iter().any(|b| b.name == binding.name) {
            return Err(PanelError::DuplicateControl(binding.name));
        }
        self.bindings.push(binding);
        Ok(())
    }

    pub fn add_number(
        &mut self,
        name: impl Into<String>,
        (min, max, step): (f32, f32, f32),
        get: impl Fn(&S) -> f32 + 'static,
        mut set: impl FnMut(&mut S, f32) -> Result<(), String> + 'static,
    ) -> Result<(), PanelError> {
        self.push(Binding {
            name: name.into(),
            control: Control::Number { min, max, step },
            get: Box::new(move |s| PanelValue::Number(get(s))),
            set: Box::new(move |s, v| match v {
                PanelValue::Number(n) => set(s, *n),
                _ => Err("expected number".into()),
            }),
            on_change: Vec::new(),
        })
    }

    pub fn add_color(
        &mut self,
        name: impl Into<String>,
        get: impl Fn(&S) -> Color + 'static,
        mut set: impl FnMut(&mut S, Color) -> Result<(), String> + 'static,
    ) -> Result<(), PanelError> {
        self.push(Binding {
            name: name.into(),
            control: Control::Color,
            get: Box::new(move |s| PanelValue::Color(get(s))),
            set: Box::new(move |s, v| match v {
                PanelValue::Color(c) => set(s, *c),
                _ => Err("expected color".into()),
            }),
            on_change: Vec::new(),
        })
    }

    pub fn add_choice(
        &mut self,
        name: impl Into<String>,
        options: Vec<&'static str>,
        get: impl Fn(&S) -> String + 'static,
        mut set: impl FnMut(&mut S, &str) -> Result<(), String> + 'static,
    ) -> Result<(), PanelError> {
        self.push(Binding {
            name: name.into(),
            control: Control::Choice(options),
            get: Box::new(move |s| PanelValue::Choice(get(s))),
            set: Box::new(move |s, v| match v {
                PanelValue::Choice(label) => set(s, label),
                _ => Err("expected choice".into()),
            }),
            on_change: Vec::new(),
        })
    }

    pub fn add_toggle(
        &mut self,
        name: impl Into<String>,
        get: impl Fn(&S) -> bool + 'static,
        mut set: impl FnMut(&mut S, bool) -> Result<(), String> + 'static,
    ) -> Result<(), PanelError> {
        self.push(Binding {
            name: name.into(),
            control: Control::Toggle,
            get: Box::new(move |s| PanelValue::Toggle(get(s))),
            set: Box::new(move |s, v| match v {
                PanelValue::Toggle(b) => set(s, *b),
                _ => Err("expected toggle".into()),
            }),
            on_change: Vec::new(),
        })
    }

    /// Register a callback fired after every successful `set` of `name`.
    pub fn on_change(
        &mut self,
        name: &str,
        callback: impl FnMut(&mut S, &PanelValue) + 'static,
    ) -> Result<(), PanelError> {
        let binding = self.binding_mut(name)?;
        binding.on_change.push(Box::new(callback));
        Ok(())
    }

    pub fn get(&self, state: &S, name: &str) -> Result<PanelValue, PanelError> {
        Ok((self.binding(name)?.get)(state))
    }

    /// Current value of every control, in registration order.
    pub fn snapshot(&self, state: &S) -> Vec<(String, PanelValue)> {
        self.bindings.iter().map(|b| (b.name.clone(), (b.get)(state))).collect()
    }

    /// Validate `value`, write it through the binding, then notify callbacks.
    /// Returns the value actually written (numbers are snapped to `step`).
    pub fn set(&mut self, state: &mut S, name: &str, value: PanelValue) -> Result<PanelValue, PanelError> {
        let binding = self.binding_mut(name)?;
        let value = validate(&binding.name, &binding.control, value)?;
        (binding.set)(state, &value).map_err(|reason| PanelError::Rejected {
            name: binding.name.clone(),
            reason,
        })?;
        for callback in &mut binding.on_change {
            callback(state, &value);
        }
        tracing::debug!(panel = %self.title, control = name, value = %value, "panel value changed");
        Ok(value)
    }

    /// Parse `text` according to the control's kind, then `set` it.
    pub fn set_from_str(&mut self, state: &mut S, name: &str, text: &str) -> Result<PanelValue, PanelError> {
        let control = &self.binding(name)?.control;
        let unparsable = || PanelError::Unparsable {
            name: name.to_string(),
            text: text.to_string(),
        };
        let value = match control {
            Control::Number { .. } => PanelValue::Number(text.trim().parse().map_err(|_| unparsable())?),
            Control::Color => PanelValue::Color(text.trim().parse().map_err(|_| unparsable())?),
            Control::Choice(_) => PanelValue::Choice(text.trim().to_string()),
            Control::Toggle => PanelValue::Toggle(text.trim().parse().map_err(|_| unparsable())?),
        };
        self.set(state, name, value)
    }

    fn binding(&self, name: &str) -> Result<&Binding<S>, PanelError> {
        self.bindings
            .iter()
            .find(|b| b.name == name)
            .ok_or_else(|| PanelError::UnknownControl(name.to_string()))
    }

    fn binding_mut(&mut self, name: &str) -> Result<&mut Binding<S>, PanelError> {
        self.bindings
            .iter_mut()
            .find(|b| b.name == name)
            .ok_or_else(|| PanelError::UnknownControl(name.to_string()))
    }
}

fn validate(name: &str, control: &Control, value: PanelValue) -> Result<PanelValue, PanelError> {
    match (control, value) {
        (Control::Number { min, max, step }, PanelValue::Number(v)) => {
            if !(*min..=*max).contains(&v) {
                return Err(PanelError::OutOfRange {
                    name: name.to_string(),
                    value: v,
                    min: *min,
                    max: *max,
                });
            }
            let snapped = if *step > 0.0 {
                (min + ((v - min) / step).round() * step).min(*max)
            } else {
                v
            };
            Ok(PanelValue::Number(snapped))
        }
        (Control::Color, v @ PanelValue::Color(_)) => Ok(v),
        (Control::Toggle, v @ PanelValue::Toggle(_)) => Ok(v),
        (Control::Choice(options), PanelValue::Choice(label)) => {
            if options.iter().any(|o| *o == label) {
                Ok(PanelValue::Choice(label))
            } else {
                Err(PanelError::UnknownChoice {
                    name: name.to_string(),
                    value: label,
                })
            }
        }
        (control, _) => Err(PanelError::TypeMismatch {
            name: name.to_string(),
            expected: control.expected(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Settings {
        size: f32,
        clear: Color,
        mode: String,
        wireframe: bool,
        changes: Vec<String>,
    }

    fn panel() -> DebugPanel<Settings> {
        let mut p = DebugPanel::new("test");
        p.add_number(
            "size",
            (0.0, 500.0, 1.0),
            |s: &Settings| s.size,
            |s, v| {
                s.size = v;
                Ok(())
            },
        )
        .unwrap();
        p.add_color(
            "clearColor",
            |s: &Settings| s.clear,
            |s, c| {
                s.clear = c;
                Ok(())
            },
        )
        .unwrap();
        p.add_choice(
            "mode",
            vec!["No", "Linear"],
            |s: &Settings| s.mode.clone(),
            |s, m| {
                s.mode = m.to_string();
                Ok(())
            },
        )
        .unwrap();
        p.add_toggle(
            "wireframe",
            |s: &Settings| s.wireframe,
            |s, b| {
                if b {
                    Err("wireframe unsupported".into())
                } else {
                    s.wireframe = b;
                    Ok(())
                }
            },
        )
        .unwrap();
        p
    }

    #[test]
    fn set_writes_and_notifies() {
        let mut p = panel();
        let mut s = Settings::default();
        p.on_change("size", |s, v| s.changes.push(format!("size={v}"))).unwrap();
        p.set(&mut s, "size", PanelValue::Number(300.0)).unwrap();
        assert_eq!(s.size, 300.0);
        assert_eq!(s.changes, vec!["size=300"]);
        assert_eq!(p.get(&s, "size").unwrap(), PanelValue::Number(300.0));
    }

    #[test]
    fn numbers_are_range_checked_and_snapped() {
        let mut p = panel();
        let mut s = Settings::default();
        assert!(matches!(
            p.set(&mut s, "size", PanelValue::Number(501.0)),
            Err(PanelError::OutOfRange { .. })
        ));
        assert_eq!(p.set(&mut s, "size", PanelValue::Number(12.4)), Ok(PanelValue::Number(12.0)));
        assert_eq!(s.size, 12.0);
    }

    #[test]
    fn failed_set_skips_callbacks() {
        let mut p = panel();
        let mut s = Settings::default();
        p.on_change("wireframe", |s, _| s.changes.push("wireframe".into()))
            .unwrap();
        assert!(matches!(
            p.set(&mut s, "wireframe", PanelValue::Toggle(true)),
            Err(PanelError::Rejected { .. })
        ));
        assert!(s.changes.is_empty());
        assert!(matches!(
            p.set(&mut s, "size", PanelValue::Toggle(true)),
            Err(PanelError::TypeMismatch { expected: "number", .. })
        ));
    }

    #[test]
    fn choices_are_checked() {
        let mut p = panel();
        let mut s = Settings::default();
        p.set(&mut s, "mode", PanelValue::Choice("Linear".into())).unwrap();
        assert_eq!(s.mode, "Linear");
        assert!(matches!(
            p.set(&mut s, "mode", PanelValue::Choice("Filmic".into())),
            Err(PanelError::UnknownChoice { .. })
        ));
    }

    #[test]
    fn set_from_str_parses_by_kind() {
        let mut p = panel();
        let mut s = Settings::default();
        p.set_from_str(&mut s, "clearColor", "#201919").unwrap();
        assert_eq!(s.clear, Color::from_hex(0x201919));
        p.set_from_str(&mut s, "size", " 42 ").unwrap();
        assert_eq!(s.size, 42.0);
        assert!(matches!(
            p.set_from_str(&mut s, "size", "big"),
            Err(PanelError::Unparsable { .. })
        ));
        assert!(matches!(
            p.set_from_str(&mut s, "missing", "1"),
            Err(PanelError::UnknownControl(_))
        ));
    }

    #[test]
    fn duplicate_names_rejected() {
        let mut p = panel();
        assert_eq!(
            p.add_toggle("size", |_: &Settings| false, |_, _| Ok(())),
            Err(PanelError::DuplicateControl("size".into()))
        );
        assert_eq!(p.len(), 4);
        let names: Vec<&str> = p.controls().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["size", "clearColor", "mode", "wireframe"]);
    }

    #[test]
    fn snapshot_lists_values() {
        let p = panel();
        let s = Settings {
            size: 150.0,
            ..Settings::default()
        };
        let snap = p.snapshot(&s);
        assert_eq!(snap[0], ("size".to_string(), PanelValue::Number(150.0)));
    }
}
