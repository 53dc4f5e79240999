use core::fmt;

/// Permission granted to embedded content.
///
/// Top-level navigation and modal dialogs have no variant: an embedded
/// service can never be granted them.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Capability {
    Scripts,
    SameOrigin,
    Forms,
    Popups,
    Downloads,
}

impl Capability {
    pub const ALL: [Capability; 5] = [
        Capability::Scripts,
        Capability::SameOrigin,
        Capability::Forms,
        Capability::Popups,
        Capability::Downloads,
    ];

    pub fn token(&self) -> &'static str {
        match self {
            Capability::Scripts => "allow-scripts",
            Capability::SameOrigin => "allow-same-origin",
            Capability::Forms => "allow-forms",
            Capability::Popups => "allow-popups",
            Capability::Downloads => "allow-downloads",
        }
    }
}

/// The fixed capability set of every embedding boundary.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Sandbox {
    capabilities: [Capability; 5],
}

impl Sandbox {
    pub fn standard() -> Self {
        Self {
            capabilities: Capability::ALL,
        }
    }

    pub fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }

    pub fn allows(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    /// Value of the `sandbox` attribute.
    pub fn attribute(&self) -> String {
        self.capabilities
            .iter()
            .map(Capability::token)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for Sandbox {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Display for Sandbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.attribute())
    }
}
