use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use virtual_list::{ListOptions, VirtualList, WaterfallList, WaterfallOptions};

use crate::Controller;

/// The four list components a host can instantiate by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ComponentKind {
    /// Single-axis list with one known extent; nothing is measured.
    Fixed,
    /// Single-axis list measured after layout.
    Estimated,
    /// Waterfall measured after layout.
    Waterfall,
    /// Waterfall whose item extents are known up front.
    FixedWaterfall,
}

impl ComponentKind {
    pub const ALL: [Self; 4] = [
        Self::Fixed,
        Self::Estimated,
        Self::Waterfall,
        Self::FixedWaterfall,
    ];

    /// The name [`install`] registers this kind under.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Fixed => "VirtualList",
            Self::Estimated => "EstimatedVirtualList",
            Self::Waterfall => "VirtualWaterFallList",
            Self::FixedWaterfall => "WaterFallList",
        }
    }

    pub const fn is_waterfall(self) -> bool {
        matches!(self, Self::Waterfall | Self::FixedWaterfall)
    }

    const fn measures(self) -> bool {
        matches!(self, Self::Estimated | Self::Waterfall)
    }
}

/// Options handed to [`Registry::create`].
#[derive(Clone, Debug)]
pub enum ComponentConfig {
    List(ListOptions),
    Waterfall(WaterfallOptions),
}

impl From<ListOptions> for ComponentConfig {
    fn from(options: ListOptions) -> Self {
        Self::List(options)
    }
}

impl From<WaterfallOptions> for ComponentConfig {
    fn from(options: WaterfallOptions) -> Self {
        Self::Waterfall(options)
    }
}

/// A created component: a controller around the matching engine.
#[derive(Clone, Debug)]
pub enum Component {
    List(Controller<VirtualList>),
    Waterfall(Controller<WaterfallList>),
}

impl Component {
    pub fn as_list(&mut self) -> Option<&mut Controller<VirtualList>> {
        match self {
            Self::List(c) => Some(c),
            Self::Waterfall(_) => None,
        }
    }

    pub fn as_waterfall(&mut self) -> Option<&mut Controller<WaterfallList>> {
        match self {
            Self::Waterfall(c) => Some(c),
            Self::List(_) => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("no component registered as `{0}`")]
    UnknownComponent(String),
    #[error("component `{name}` expects {expected} options")]
    ConfigMismatch {
        name: String,
        expected: &'static str,
    },
}

/// Name → component table a host resolves components from.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    components: BTreeMap<String, ComponentKind>,
    installed: bool,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `kind` under `name`, replacing any previous entry. Returns `true` when the
    /// name was new.
    pub fn register(&mut self, name: impl Into<String>, kind: ComponentKind) -> bool {
        self.components.insert(name.into(), kind).is_none()
    }

    pub fn kind(&self, name: &str) -> Option<ComponentKind> {
        self.components.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.components.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.components.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn is_installed(&self) -> bool {
        self.installed
    }

    /// Instantiates the component registered as `name`.
    ///
    /// The kind decides whether items are measured: fixed kinds turn measurement off and
    /// estimated kinds turn it on, whatever `config` says.
    pub fn create(
        &self,
        name: &str,
        config: impl Into<ComponentConfig>,
    ) -> Result<Component, RegistryError> {
        let kind = self
            .kind(name)
            .ok_or_else(|| RegistryError::UnknownComponent(name.to_string()))?;
        adebug!(name, ?kind, "create component");
        match (kind.is_waterfall(), config.into()) {
            (false, ComponentConfig::List(options)) => {
                let options = options.with_measure(kind.measures());
                Ok(Component::List(Controller::new(VirtualList::new(options))))
            }
            (true, ComponentConfig::Waterfall(mut options)) => {
                options.measure = kind.measures();
                Ok(Component::Waterfall(Controller::new(WaterfallList::new(
                    options,
                ))))
            }
            (waterfall, _) => Err(RegistryError::ConfigMismatch {
                name: name.to_string(),
                expected: if waterfall { "waterfall" } else { "list" },
            }),
        }
    }
}

/// Registers every built-in component under its public name.
///
/// Idempotent per registry: returns `false` (and changes nothing) when already installed.
pub fn install(registry: &mut Registry) -> bool {
    if registry.installed {
        return false;
    }
    for kind in ComponentKind::ALL {
        registry.register(kind.name(), kind);
    }
    registry.installed = true;
    true
}
