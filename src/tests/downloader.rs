#[cfg(test)]
mod downloader {
    use std::{
        cell::RefCell,
        collections::HashMap,
        io::Cursor,
        path::{Path, PathBuf},
        rc::Rc,
        time::Duration,
    };

    use id3::{frame::PictureType, Tag, TagLike};
    use image::{DynamicImage, ImageFormat, RgbImage};
    use wiremock::{
        matchers::{method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    use crate::{
        downloader::{Downloader, Options, Summary},
        fetch::Fetcher,
        render::Render,
        report::Reporter,
        targets::{self, Target},
    };

    const PRODUCER: &str = "https://www.beatstars.com/producer/tracks";

    const PAGE: &str = r#"
<html>
  <body>
    <span class="name ng-star-inserted">Producer</span>
    <mp-card-figure-template class="track-template">
      <a class="name ng-star-inserted" href="/TK1">Beat One</a>
    </mp-card-figure-template>
  </body>
</html>"#;

    /// Serves fixed pages, and remembers which were asked for.
    struct Pages {
        pages: HashMap<String, String>,
        seen: Rc<RefCell<Vec<String>>>,
    }

    impl Render for Pages {
        async fn render(&self, url: &str) -> crate::Result<String> {
            self.seen.borrow_mut().push(url.to_owned());
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| crate::Error::NotFound(url.to_owned()))
        }
    }

    fn options(server: &MockServer, output: &Path, overwrite: bool) -> Options {
        Options {
            output: output.to_path_buf(),
            album: None,
            overwrite,
            stream_base: format!("{}/stream", server.uri()),
        }
    }

    fn build(
        pages: HashMap<String, String>,
        options: Options,
    ) -> (Downloader<Pages>, Rc<RefCell<Vec<String>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let pages = Pages {
            pages,
            seen: Rc::clone(&seen),
        };

        let fetcher = Fetcher::new(Duration::from_secs(5)).unwrap();
        let downloader = Downloader::new(pages, fetcher, options, Reporter::quiet());

        (downloader, seen)
    }

    fn downloader(
        server: &MockServer,
        output: &Path,
        overwrite: bool,
    ) -> (Downloader<Pages>, Rc<RefCell<Vec<String>>>) {
        build(
            HashMap::from([(PRODUCER.to_owned(), PAGE.to_owned())]),
            options(server, output, overwrite),
        )
    }

    /// A few frames of silent 128kbps mpeg audio.
    fn mp3() -> Vec<u8> {
        let mut frame = vec![0xFF, 0xFB, 0x90, 0x64];
        frame.resize(417, 0);
        frame.repeat(20)
    }

    fn jpeg() -> Vec<u8> {
        let image = DynamicImage::ImageRgb8(RgbImage::new(4, 4));
        let mut data = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut data), ImageFormat::Jpeg)
            .unwrap();

        data
    }

    fn existing(output: &Path) -> PathBuf {
        let dir = output.join("Producer");
        std::fs::create_dir_all(&dir).unwrap();

        let path = dir.join("Beat One.mp3");
        std::fs::write(&path, b"already here").unwrap();
        path
    }

    async fn stream(server: &MockServer, status: u16, body: &[u8], times: u64) {
        stream_id(server, "1", status, body, times).await;
    }

    async fn stream_id(server: &MockServer, id: &str, status: u16, body: &[u8], times: u64) {
        Mock::given(method("GET"))
            .and(path("/stream"))
            .and(query_param("id", id))
            .and(query_param("return", "audio"))
            .respond_with(ResponseTemplate::new(status).set_body_bytes(body.to_vec()))
            .expect(times)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn existing_files_are_skipped() {
        let server = MockServer::start().await;
        stream(&server, 200, b"audio", 0).await;

        let output = tempfile::tempdir().unwrap();
        let file = existing(output.path());
        let (downloader, _) = downloader(&server, output.path(), false);

        let summary = downloader.artist("producer").await.unwrap();
        assert_eq!(
            summary,
            Summary {
                saved: 0,
                skipped: 1,
                failed: 0
            }
        );
        assert_eq!(std::fs::read(file).unwrap(), b"already here");
        server.verify().await;
    }

    #[tokio::test]
    async fn saves_and_tags_tracks() {
        let server = MockServer::start().await;
        stream_id(&server, "1", 200, &mp3(), 1).await;
        stream_id(&server, "2", 200, &mp3(), 1).await;
        Mock::given(method("GET"))
            .and(path("/a.jpg"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/b.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(jpeg()))
            .mount(&server)
            .await;

        let page = format!(
            r#"
<html>
  <body>
    <span class="name ng-star-inserted">Prod</span>
    <mp-card-figure-template class="track-template">
      <img src="{uri}/a.jpg">
      <a class="name ng-star-inserted" href="/TK1">One</a>
    </mp-card-figure-template>
    <mp-card-figure-template class="track-template">
      <img src="{uri}/b.jpg">
      <a class="name ng-star-inserted" href="/TK2">One!</a>
    </mp-card-figure-template>
  </body>
</html>"#,
            uri = server.uri()
        );

        let output = tempfile::tempdir().unwrap();
        let options = Options {
            album: Some("Alb".into()),
            ..options(&server, output.path(), false)
        };
        let (downloader, _) = build(
            HashMap::from([("https://www.beatstars.com/prod/tracks".to_owned(), page)]),
            options,
        );

        let summary = downloader.artist("prod").await.unwrap();
        assert_eq!(
            summary,
            Summary {
                saved: 2,
                skipped: 0,
                failed: 0
            }
        );

        let dir = output.path().join("Prod");
        for (file, title) in [("One.mp3", "One"), ("One-2.mp3", "One-2")] {
            let tag = Tag::read_from_path(dir.join(file)).unwrap();
            assert_eq!(tag.title(), Some(title));
            assert_eq!(tag.artist(), Some("Prod"));
            assert_eq!(tag.album(), Some("Alb"));

            // The first track's own artwork is missing, so the second's is used.
            let pictures: Vec<_> = tag.pictures().collect();
            assert_eq!(pictures.len(), 1);
            assert_eq!(pictures[0].picture_type, PictureType::CoverFront);
            assert_eq!(pictures[0].mime_type, "image/png");
        }

        assert!(!dir.join("One.mp3.part").exists());
        server.verify().await;
    }

    #[tokio::test]
    async fn overwrite_replaces_file() {
        let server = MockServer::start().await;
        stream(&server, 200, &mp3(), 1).await;

        let output = tempfile::tempdir().unwrap();
        let file = existing(output.path());
        let (downloader, _) = downloader(&server, output.path(), true);

        let summary = downloader.artist("producer").await.unwrap();
        assert_eq!(summary.saved, 1);

        let written = std::fs::read(&file).unwrap();
        assert_ne!(written, b"already here");
        assert!(written.ends_with(&mp3()));
        assert_eq!(Tag::read_from_path(&file).unwrap().title(), Some("Beat One"));
        server.verify().await;
    }

    #[tokio::test]
    async fn failed_writes_leave_nothing_to_skip() {
        let server = MockServer::start().await;
        stream(&server, 200, &mp3(), 2).await;

        let output = tempfile::tempdir().unwrap();
        let dir = output.path().join("Producer");
        let partial = dir.join("Beat One.mp3.part");

        // A directory in the way makes writing the audio fail.
        std::fs::create_dir_all(&partial).unwrap();
        let (downloader, _) = downloader(&server, output.path(), false);

        let summary = downloader.artist("producer").await.unwrap();
        assert_eq!(summary.failed, 1);
        assert!(!dir.join("Beat One.mp3").exists());

        std::fs::remove_dir(&partial).unwrap();
        let summary = downloader.artist("producer").await.unwrap();
        assert_eq!(summary.saved, 1);
        assert_eq!(summary.skipped, 0);
        assert!(dir.join("Beat One.mp3").exists());
        server.verify().await;
    }

    #[tokio::test]
    async fn overwrite_fetches_again() {
        let server = MockServer::start().await;
        stream(&server, 200, b"an error page, not audio", 1).await;

        let output = tempfile::tempdir().unwrap();
        let file = existing(output.path());
        let (downloader, _) = downloader(&server, output.path(), true);

        let summary = downloader.artist("producer").await.unwrap();
        assert_eq!(summary.skipped, 0);
        assert_eq!(summary.failed, 1);

        // The payload was rejected, so the old file is left alone.
        assert_eq!(std::fs::read(file).unwrap(), b"already here");
        server.verify().await;
    }

    #[tokio::test]
    async fn unavailable_tracks_fail_without_stopping() {
        let server = MockServer::start().await;
        stream(&server, 404, b"", 1).await;

        let output = tempfile::tempdir().unwrap();
        let (downloader, _) = downloader(&server, output.path(), false);

        let summary = downloader.artist("producer").await.unwrap();
        assert_eq!(summary.failed, 1);
        assert!(output.path().join("Producer").is_dir());
        assert!(!output.path().join("Producer/Beat One.mp3").exists());
    }

    #[tokio::test]
    async fn foreign_urls_never_render() {
        let server = MockServer::start().await;
        let output = tempfile::tempdir().unwrap();
        let (downloader, seen) = downloader(&server, output.path(), false);

        let result = downloader.artist("https://example.com/producer").await;
        assert!(matches!(result, Err(crate::Error::NotBeatStars(_))));
        assert!(seen.borrow().is_empty());
    }

    #[tokio::test]
    async fn list_continues_after_failures() {
        let server = MockServer::start().await;
        stream(&server, 200, b"audio", 0).await;

        let output = tempfile::tempdir().unwrap();
        existing(output.path());
        let (downloader, seen) = downloader(&server, output.path(), false);

        let mut list = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        std::io::Write::write_all(&mut list, b"missing\nproducer\nmissing\nproducer\n").unwrap();

        let target = Target::List(list.path().to_path_buf());
        let summary = targets::run(&target, &downloader, &Reporter::quiet())
            .await
            .unwrap();

        assert_eq!(summary.skipped, 1);
        assert_eq!(
            *seen.borrow(),
            [
                "https://www.beatstars.com/missing/tracks",
                "https://www.beatstars.com/producer/tracks",
            ]
        );
    }

    #[tokio::test]
    async fn single_artist_failures_propagate() {
        let server = MockServer::start().await;
        let output = tempfile::tempdir().unwrap();
        let (downloader, _) = downloader(&server, output.path(), false);

        let target = Target::Artist("missing".into());
        let result = targets::run(&target, &downloader, &Reporter::quiet()).await;
        assert!(matches!(result, Err(crate::Error::NotFound(_))));
    }
}
