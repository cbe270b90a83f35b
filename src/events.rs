use crate::page::Page;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventKind {
    Click,
    KeyDown,
    Scroll,
    Resize,
    PopState,
    Intersection,
    /// Raised by the anchor scroller after it handled an in-page navigation.
    Navigated,
}

impl EventKind {
    /// DOM event name for kinds that come straight from the browser.
    pub fn dom_name(self) -> Option<&'static str> {
        match self {
            EventKind::Click => Some("click"),
            EventKind::KeyDown => Some("keydown"),
            EventKind::Scroll => Some("scroll"),
            EventKind::Resize => Some("resize"),
            EventKind::PopState => Some("popstate"),
            EventKind::Intersection | EventKind::Navigated => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub meta: bool,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Modifiers {
    pub fn any(&self) -> bool {
        self.meta || self.ctrl || self.shift || self.alt
    }
}

/// Which observer an intersection batch came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Watch {
    Hero,
    Sections,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionEntry<E> {
    pub target: E,
    pub is_intersecting: bool,
    pub ratio: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent<E> {
    Click {
        target: Option<E>,
        modifiers: Modifiers,
    },
    KeyDown {
        key: String,
    },
    Scroll,
    Resize,
    PopState,
    Intersection {
        watch: Watch,
        entries: Vec<IntersectionEntry<E>>,
    },
    Navigated,
}

impl<E> PageEvent<E> {
    pub fn kind(&self) -> EventKind {
        match self {
            PageEvent::Click { .. } => EventKind::Click,
            PageEvent::KeyDown { .. } => EventKind::KeyDown,
            PageEvent::Scroll => EventKind::Scroll,
            PageEvent::Resize => EventKind::Resize,
            PageEvent::PopState => EventKind::PopState,
            PageEvent::Intersection { .. } => EventKind::Intersection,
            PageEvent::Navigated => EventKind::Navigated,
        }
    }

    /// Internal signal raised through [`Reaction::emit`], delivered as an event of its own.
    pub fn signal(kind: EventKind) -> Option<Self> {
        match kind {
            EventKind::Navigated => Some(PageEvent::Navigated),
            _ => None,
        }
    }

    #[cfg(test)]
    pub fn click(target: E) -> Self {
        PageEvent::Click {
            target: Some(target),
            modifiers: Modifiers::default(),
        }
    }

    #[cfg(test)]
    pub fn key(key: &str) -> Self {
        PageEvent::KeyDown {
            key: key.to_string(),
        }
    }
}

/// What a component wants done after handling an event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reaction {
    pub prevent_default: bool,
    pub signals: Vec<EventKind>,
}

impl Reaction {
    pub fn ignored() -> Self {
        Self::default()
    }

    pub fn prevented() -> Self {
        Self {
            prevent_default: true,
            signals: Vec::new(),
        }
    }

    pub fn emit(mut self, signal: EventKind) -> Self {
        self.signals.push(signal);
        self
    }

    pub fn merge(&mut self, other: Reaction) {
        self.prevent_default |= other.prevent_default;
        self.signals.extend(other.signals);
    }
}

/// An observer a component asked for at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation<E> {
    pub watch: Watch,
    pub targets: Vec<E>,
    pub root_margin: String,
    pub thresholds: Vec<f64>,
}

/// One enhancement. Declares what it listens to and reacts to those events only.
pub trait Component<P: Page> {
    fn name(&self) -> &'static str;

    fn subscriptions(&self) -> &[EventKind];

    fn observation(&self) -> Option<Observation<P::Element>> {
        None
    }

    fn handle(&mut self, page: &P, event: &PageEvent<P::Element>) -> Reaction;
}
