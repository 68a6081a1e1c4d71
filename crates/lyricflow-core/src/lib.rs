pub mod activation;
pub mod animation;
pub mod cache;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod model;
pub mod script;
pub mod scroll;
pub mod source;
pub mod surface;
pub mod timer;
pub mod timing;
pub mod visibility;

pub use activation::{ActivationScheduler, ActivationState, SyllableState};
pub use animation::{derive_animation_parameters, AnimationParameterDeriver, PreHighlight};
pub use cache::TimelineCache;
pub use clock::{Clock, ManualWallClock, PlaybackClock, SystemWallClock, WallClock};
pub use config::{AppConfig, EasingType, ScrollConfig};
pub use engine::{LyricsEngine, TickReport};
pub use error::{Error, Result};
pub use metrics::{CellMeasurer, FontDescriptor, FontKey, TextMeasurer, TextMetrics};
pub use model::{CharWipe, Line, LineId, LineKind, Syllable, SyllableId, Timeline};
pub use scroll::{PositionClass, ScrollCoordinator};
pub use source::{load_timeline, parse_source, parse_str, SourceFormat};
pub use surface::{RecordingSurface, RenderSurface, SurfaceCommand};
pub use timer::CancellableTimer;
pub use timing::{correct_timings, TimingCorrector};
pub use visibility::{AllVisible, LineExtent, VisibilityIndex, ViewportIndex};
