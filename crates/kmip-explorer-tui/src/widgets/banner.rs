//! Header with server info, key help and the logo.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

use kmip_explorer_core::ServerInfo;

use crate::theme;

const LOGO: [&str; 5] = [
    r" _  _ __  __ ___ ____  ",
    r"| |/ |  \/  |_ _|  _ \ ",
    r"| ' /| |\/| || || |_) |",
    r"| . \| |  | || ||  __/ ",
    r"|_|\_|_|  |_|___|_|    ",
];

const LOGO_WIDTH: u16 = 23;

/// Key bindings shown in the banner, in three columns of four.
const HELP: [[(&str, &str); 3]; 4] = [
    [
        ("<ctrl+r>", "Refresh"),
        ("<a>", "Activate"),
        ("<tab>", "Next page"),
    ],
    [
        ("<shift+c>", "Create key"),
        ("<r>", "Revoke"),
        ("<shift+tab>", "Previous page"),
    ],
    [
        ("<shift+r>", "Register"),
        ("<ctrl+d>", "Destroy"),
        ("<enter>", "Browse attributes"),
    ],
    [
        ("<space>", "Get content"),
        ("<ctrl+t>", "Rekey"),
        ("<q>", "Quit"),
    ],
];

pub const HEIGHT: u16 = 5;

pub struct Banner {
    server: String,
    kmip_version: String,
    client_version: &'static str,
    latest_release: Option<String>,
}

impl Banner {
    pub fn new(info: &ServerInfo, client_version: &'static str) -> Self {
        Self {
            server: info.address.clone(),
            kmip_version: format!("v{}", info.protocol_version),
            client_version,
            latest_release: None,
        }
    }

    pub fn set_latest_release(&mut self, tag: String) {
        self.latest_release = Some(tag);
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let [info_area, help_area, logo_area] = Layout::horizontal([
            Constraint::Fill(1),
            Constraint::Fill(2),
            Constraint::Length(LOGO_WIDTH),
        ])
        .areas(area);

        let field = |label: &'static str, value: String| {
            Line::from(vec![
                Span::styled(label, theme::info_label()),
                Span::styled(value, Style::default().fg(theme::DIM_WHITE)),
            ])
        };
        let mut info = vec![
            field("Server Name:    ", self.server.clone()),
            field("Client Version: ", self.client_version.to_owned()),
            field("KMIP Version:   ", self.kmip_version.clone()),
        ];
        if let Some(tag) = &self.latest_release {
            info.push(Line::from(Span::styled(
                format!("Update available: {tag}"),
                Style::default().fg(theme::SUCCESS_GREEN),
            )));
        }
        frame.render_widget(Paragraph::new(info), info_area);

        let help: Vec<Line> = HELP
            .iter()
            .map(|row| {
                let spans = row.iter().flat_map(|(key, what)| {
                    [
                        Span::styled(format!("{key:<13}"), theme::key_hint_key()),
                        Span::styled(format!("{what:<19}"), Style::default().fg(theme::DIM_WHITE)),
                    ]
                });
                Line::from(spans.collect::<Vec<_>>())
            })
            .collect();
        frame.render_widget(Paragraph::new(help), help_area);

        let logo: Vec<Line> = LOGO
            .iter()
            .map(|l| Line::from(Span::styled(*l, Style::default().fg(theme::ORANGE))))
            .collect();
        frame.render_widget(Paragraph::new(logo).alignment(Alignment::Right), logo_area);
    }
}
