//! Extracts the artist & their tracks from a rendered artist page.

use std::{collections::HashSet, sync::LazyLock};

use scraper::{ElementRef, Html, Selector};

use crate::{
    links,
    tracks::{format, Track},
};

/// The page title, which reads `404` for missing artists.
static TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("span.title").unwrap());

/// The artist's display name in the profile header.
static ARTIST: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span.name.ng-star-inserted").unwrap());

/// Every track card in the catalog.
static CARD: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("mp-card-figure-template.track-template").unwrap());

/// The link inside of a card, holding both the title & track id.
static LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a.name.ng-star-inserted").unwrap());

/// The artwork inside of a card.
static IMAGE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img[src]").unwrap());

/// Collects the text of an element.
fn text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_owned()
}

/// A parsed snapshot of an artist page.
pub struct Page {
    /// The parsed document.
    html: Html,
}

impl Page {
    pub fn parse(document: &str) -> Self {
        Self {
            html: Html::parse_document(document),
        }
    }

    /// Whether the site served its 404 page instead of an artist.
    pub fn not_found(&self) -> bool {
        self.html.select(&TITLE).any(|x| text(x) == "404")
    }

    /// Gets the file-safe name of the artist.
    pub fn artist(&self) -> crate::Result<String> {
        let name = self
            .html
            .select(&ARTIST)
            .next()
            .map(|x| format::slugify(&text(x)))
            .ok_or(crate::Error::ArtistName)?;

        if name.is_empty() {
            return Err(crate::Error::ArtistName);
        }

        Ok(name)
    }

    /// Gets every track on the page, in order.
    ///
    /// Cards without a usable link are skipped. Titles which end up with the
    /// same name get a numeric suffix, so that no track overwrites or
    /// shadows another one's file.
    pub fn tracks(&self, stream_base: &str) -> Vec<Track> {
        let mut taken = HashSet::new();

        self.html
            .select(&CARD)
            .filter_map(|card| {
                let link = card.select(&LINK).next()?;
                let stream_url = links::stream_url(stream_base, link.attr("href")?)?;
                let artwork = card
                    .select(&IMAGE)
                    .next()
                    .and_then(|x| x.attr("src"))
                    .filter(|x| !x.is_empty())
                    .map(ToOwned::to_owned);

                Some((text(link), stream_url, artwork))
            })
            .enumerate()
            .map(|(i, (title, stream_url, artwork))| Track {
                name: unique(&mut taken, format::name(&title, i + 1)),
                stream_url,
                artwork,
            })
            .collect()
    }
}

/// Appends `-2`, `-3` and so on to `name` until it isn't in `taken`.
fn unique(taken: &mut HashSet<String>, name: String) -> String {
    let mut candidate = name.clone();
    let mut n = 2;
    while taken.contains(&candidate) {
        candidate = format!("{name}-{n}");
        n += 1;
    }

    taken.insert(candidate.clone());
    candidate
}
