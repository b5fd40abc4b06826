//! Chart and page text per deployment language.

use crate::config::Language;

pub struct Labels {
    pub html_lang: &'static str,
    pub page_title: &'static str,
    pub page_heading: &'static str,
    pub data_source: &'static str,
    pub append_only_note: &'static str,
    pub latest_snapshot: &'static str,
    pub no_snapshot: &'static str,

    /// `{days}` is replaced by the window length.
    pub total_title: &'static str,
    pub total_x: &'static str,
    pub total_y: &'static str,
    pub total_alt: &'static str,

    pub hourly_title: &'static str,
    pub hourly_heading: &'static str,
    pub hourly_x: &'static str,
    pub hourly_y: &'static str,
    pub hourly_alt: &'static str,

    /// Prefix of the top-stations title; the snapshot time is appended.
    /// `{n}` is replaced by the number of stations shown.
    pub top_title: &'static str,
    pub top_heading: &'static str,
    pub top_x: &'static str,
    pub top_y: &'static str,
    pub top_alt: &'static str,

    pub clock_title: &'static str,
    /// Prefix of the clock-view x axis; the zone name is appended.
    pub clock_x: &'static str,
    pub clock_y: &'static str,
}

static GERMAN: Labels = Labels {
    html_lang: "de",
    page_title: "WienMobil Bikes – Ergebnisse",
    page_heading: "WienMobil Bikes – einfache Visualisierung",
    data_source: "Datenquelle",
    append_only_note: "eine Datei, Append-Only",
    latest_snapshot: "Letzter Snapshot",
    no_snapshot: "kein gültiger Zeitstempel",

    total_title: "Gesamt verfügbare Räder (letzte {days} Tage)",
    total_x: "Zeit (UTC)",
    total_y: "Anzahl Räder",
    total_alt: "Zeitreihe: Gesamt verfügbare Räder",

    hourly_title: "Durchschnittlich verfügbare Räder je Stunde (UTC)",
    hourly_heading: "Tagesrhythmus (Durchschnitt je Stunde, UTC)",
    hourly_x: "Stunde",
    hourly_y: "Ø Räder",
    hourly_alt: "Durchschnittlich verfügbare Räder je Stunde",

    top_title: "Top-{n} Stationen – Räder @",
    top_heading: "Top-{n} Stationen im jüngsten Snapshot",
    top_x: "Station",
    top_y: "Räder verfügbar",
    top_alt: "Top-Stationen im jüngsten Snapshot",

    clock_title: "Verfügbare Räder gesamt (alle Stationen)",
    clock_x: "Zeit",
    clock_y: "Räder gesamt",
};

static ENGLISH: Labels = Labels {
    html_lang: "en",
    page_title: "WienMobil Bikes – Results",
    page_heading: "WienMobil Bikes – simple visualization",
    data_source: "Data source",
    append_only_note: "single file, append-only",
    latest_snapshot: "Latest snapshot",
    no_snapshot: "no valid timestamp",

    total_title: "Total bikes available (last {days} days)",
    total_x: "Time (UTC)",
    total_y: "Bikes",
    total_alt: "Time series: total bikes available",

    hourly_title: "Average bikes available per hour (UTC)",
    hourly_heading: "Daily rhythm (average per hour, UTC)",
    hourly_x: "Hour",
    hourly_y: "Avg. bikes",
    hourly_alt: "Average bikes available per hour",

    top_title: "Top {n} stations – bikes @",
    top_heading: "Top {n} stations in the latest snapshot",
    top_x: "Station",
    top_y: "Bikes available",
    top_alt: "Top stations in the latest snapshot",

    clock_title: "Total bikes available (all stations)",
    clock_x: "Time",
    clock_y: "Total bikes",
};

impl Labels {
    pub fn total_title(&self, window_days: i64) -> String {
        self.total_title.replace("{days}", &window_days.to_string())
    }

    pub fn top_title(&self, top_n: usize) -> String {
        self.top_title.replace("{n}", &top_n.to_string())
    }

    pub fn top_heading(&self, top_n: usize) -> String {
        self.top_heading.replace("{n}", &top_n.to_string())
    }
}

pub fn for_language(language: Language) -> &'static Labels {
    match language {
        Language::De => &GERMAN,
        Language::En => &ENGLISH,
    }
}
