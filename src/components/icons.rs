/// Inline SVG icons for the control surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    Play,
    Pause,
    SkipBack,
    SkipForward,
    Volume,
    Muted,
    Settings,
    Pip,
    Fullscreen,
    ExitFullscreen,
}

const FILLED: &str = r#"fill="currentColor""#;
const STROKED: &str = r#"fill="none" stroke="currentColor" stroke-width="2""#;

impl Icon {
    pub fn name(self) -> &'static str {
        match self {
            Icon::Play => "play",
            Icon::Pause => "pause",
            Icon::SkipBack => "skip-back",
            Icon::SkipForward => "skip-forward",
            Icon::Volume => "volume",
            Icon::Muted => "muted",
            Icon::Settings => "settings",
            Icon::Pip => "pip",
            Icon::Fullscreen => "fullscreen",
            Icon::ExitFullscreen => "exit-fullscreen",
        }
    }

    fn body(self) -> &'static str {
        match self {
            Icon::Play => r#"<polygon points="5 3 19 12 5 21 5 3"></polygon>"#,
            Icon::Pause => {
                r#"<rect x="6" y="4" width="4" height="16"></rect><rect x="14" y="4" width="4" height="16"></rect>"#
            }
            Icon::SkipBack => {
                r#"<path d="M20 12a8 8 0 1 1-3.2-6.4"></path><polyline points="9 9 6 12 9 15"></polyline><line x1="7" y1="12" x2="13" y2="12"></line>"#
            }
            Icon::SkipForward => {
                r#"<path d="M4 12a8 8 0 1 0 3.2-6.4"></path><polyline points="15 9 18 12 15 15"></polyline><line x1="17" y1="12" x2="11" y2="12"></line>"#
            }
            Icon::Volume => {
                r#"<polygon points="11 5 6 9 2 9 2 15 6 15 11 19 11 5"></polygon><path d="M15.54 8.46a5 5 0 0 1 0 7.07"></path><path d="M19.07 4.93a10 10 0 0 1 0 14.14"></path>"#
            }
            Icon::Muted => {
                r#"<polygon points="11 5 6 9 2 9 2 15 6 15 11 19 11 5"></polygon><line x1="22" y1="9" x2="16" y2="15"></line><line x1="16" y1="9" x2="22" y2="15"></line>"#
            }
            Icon::Settings => {
                r#"<circle cx="12" cy="12" r="3"></circle><path d="M19.4 15a1.65 1.65 0 0 0 .33 1.82l.06.06a2 2 0 0 1 0 2.83 2 2 0 0 1-2.83 0l-.06-.06a1.65 1.65 0 0 0-1.82-.33 1.65 1.65 0 0 0-1 1.51V21a2 2 0 0 1-2 2 2 2 0 0 1-2-2v-.09A1.65 1.65 0 0 0 9 19.4a1.65 1.65 0 0 0-1.82.33l-.06.06a2 2 0 0 1-2.83 0 2 2 0 0 1 0-2.83l.06-.06a1.65 1.65 0 0 0 .33-1.82 1.65 1.65 0 0 0-1.51-1H3a2 2 0 0 1-2-2 2 2 0 0 1 2-2h.09A1.65 1.65 0 0 0 4.6 9a1.65 1.65 0 0 0-.33-1.82l-.06-.06a2 2 0 0 1 0-2.83 2 2 0 0 1 2.83 0l.06.06a1.65 1.65 0 0 0 1.82.33H9a1.65 1.65 0 0 0 1-1.51V3a2 2 0 0 1 2-2 2 2 0 0 1 2 2v.09a1.65 1.65 0 0 0 1 1.51 1.65 1.65 0 0 0 1.82-.33l.06-.06a2 2 0 0 1 2.83 0 2 2 0 0 1 0 2.83l-.06.06a1.65 1.65 0 0 0-.33 1.82V9a1.65 1.65 0 0 0 1.51 1H21a2 2 0 0 1 2 2 2 2 0 0 1-2 2h-.09a1.65 1.65 0 0 0-1.51 1z"></path>"#
            }
            Icon::Pip => {
                r#"<rect x="2" y="4" width="20" height="16" rx="2"></rect><rect x="12" y="11" width="7" height="6" rx="1"></rect>"#
            }
            Icon::Fullscreen => {
                r#"<polyline points="15 3 21 3 21 9"></polyline><polyline points="9 21 3 21 3 15"></polyline><polyline points="21 15 21 21 15 21"></polyline><polyline points="3 9 3 3 9 3"></polyline>"#
            }
            Icon::ExitFullscreen => {
                r#"<polyline points="4 14 10 14 10 20"></polyline><polyline points="20 10 14 10 14 4"></polyline><polyline points="14 20 14 14 20 14"></polyline><polyline points="10 4 10 10 4 10"></polyline>"#
            }
        }
    }

    fn paint(self) -> &'static str {
        match self {
            Icon::Play | Icon::Pause => FILLED,
            _ => STROKED,
        }
    }

    /// Full `<svg>` markup, decorative only.
    pub fn markup(self) -> String {
        format!(
            r#"<svg class="vc-ico vc-ico-{}" viewBox="0 0 24 24" {} aria-hidden="true">{}</svg>"#,
            self.name(),
            self.paint(),
            self.body()
        )
    }
}
