//! Predefined message catalogs.
//!
//! Frames carry a zero-based index; operators type the 1-based number.

/// A fixed list of predefined messages.
#[derive(Debug)]
pub struct Catalog {
    name: &'static str,
    messages: &'static [&'static str],
}

/// Messages a field unit sends to the base station.
pub static EMERGENCY_MESSAGES: Catalog = Catalog {
    name: "emergency",
    messages: &[
        "I'm OK",
        "I need water",
        "I need food",
        "I need medical assistance",
        "I'm lost, send help",
        "I am injured",
        "There is a fire nearby",
        "I need shelter",
        "I am trapped, please rescue",
        "Send my location to the rescue team",
    ],
};

/// Messages the base station sends to field units.
pub static BASE_MESSAGES: Catalog = Catalog {
    name: "base",
    messages: &[
        "All clear",
        "Evacuate immediately",
        "Proceed to checkpoint",
        "Remain calm",
        "Await further instructions",
        "Medical team is en route",
        "Rescue team dispatched",
        "Help is arriving",
        "Situation under control",
        "Mission accomplished",
    ],
};

impl Catalog {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Look up by zero-based wire index.
    pub fn get(&self, msg_id: u8) -> Option<&'static str> {
        self.messages.get(usize::from(msg_id)).copied()
    }

    /// Look up by 1-based operator number.
    pub fn by_number(&self, number: usize) -> Option<&'static str> {
        number.checked_sub(1).and_then(|i| self.messages.get(i)).copied()
    }

    /// Highest valid zero-based index.
    pub fn max_index(&self) -> u8 {
        self.messages.len().saturating_sub(1).min(u8::MAX as usize) as u8
    }

    /// `(number, text)` pairs with 1-based numbers, for menus.
    pub fn numbered(&self) -> impl Iterator<Item = (usize, &'static str)> {
        self.messages.iter().enumerate().map(|(i, m)| (i + 1, *m))
    }
}
