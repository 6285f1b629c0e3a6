//! UI route - HTML page for the soundalike web interface
//!
//! Single page served inline (vanilla HTML/CSS/ES6, no frameworks).

use axum::{
    response::{Html, IntoResponse},
    routing::get,
    Router,
};

use crate::AppState;

/// Build UI routes
pub fn ui_routes() -> Router<AppState> {
    Router::new().route("/", get(root_page))
}

/// Root page - similar tracks search
async fn root_page() -> impl IntoResponse {
    Html(
        r##"
<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>soundalike - Similar Tracks</title>
    <style>
        body {
            font-family: system-ui, -apple-system, sans-serif;
            max-width: 900px;
            margin: 40px auto;
            padding: 20px;
            line-height: 1.5;
        }
        h1 {
            color: #333;
            border-bottom: 2px solid #0066cc;
            padding-bottom: 10px;
        }
        form {
            display: flex;
            gap: 10px;
            margin: 20px 0;
        }
        #reference {
            flex: 1;
            padding: 10px;
            border: 1px solid #ccc;
            border-radius: 4px;
        }
        #limit {
            padding: 10px;
            border: 1px solid #ccc;
            border-radius: 4px;
        }
        button[type="submit"] {
            padding: 10px 20px;
            background: #0066cc;
            color: white;
            border: none;
            border-radius: 4px;
            cursor: pointer;
        }
        button[type="submit"]:hover { background: #0052a3; }
        button[type="submit"]:disabled { background: #999; }
        .hidden { display: none; }
        #error {
            background: #fdecea;
            color: #b71c1c;
            padding: 12px;
            border-radius: 4px;
            margin: 10px 0;
        }
        .track-card, #seed-track {
            display: flex;
            align-items: center;
            gap: 14px;
            background: #f5f5f5;
            border-radius: 4px;
            padding: 12px;
            margin: 10px 0;
        }
        .track-card img, #seed-track img {
            width: 64px;
            height: 64px;
            border-radius: 4px;
            object-fit: cover;
        }
        .track-info { flex: 1; }
        .track-info .name { font-weight: 600; }
        .track-info .detail { color: #555; font-size: 14px; }
        .track-info a { color: #0066cc; text-decoration: none; }
        .badge {
            display: inline-block;
            background: #e3efff;
            color: #0052a3;
            border-radius: 10px;
            padding: 2px 8px;
            font-size: 12px;
            margin: 2px 2px 0 0;
        }
        .tag { background: #eee; color: #444; }
        .play-btn {
            border: none;
            background: #0066cc;
            color: white;
            border-radius: 50%;
            width: 36px;
            height: 36px;
            cursor: pointer;
        }
    </style>
</head>
<body>
    <h1>soundalike</h1>
    <p>Paste a Spotify track link and find similar tracks, enriched with
       tags, tempo and audio previews.</p>

    <form id="search-form">
        <input id="reference" type="text"
               placeholder="https://open.spotify.com/track/... or spotify:track:..." />
        <select id="limit">
            <option value="10" selected>10 results</option>
            <option value="20">20 results</option>
            <option value="30">30 results</option>
            <option value="50">50 results</option>
        </select>
        <button id="search-btn" type="submit">Search</button>
    </form>

    <p id="loading" class="hidden">Searching…</p>
    <div id="error" class="hidden"></div>
    <div id="seed-track" class="hidden"></div>
    <div id="results"></div>

    <script>
        (() => {
            const form = document.getElementById("search-form");
            const referenceInput = document.getElementById("reference");
            const searchBtn = document.getElementById("search-btn");
            const seedEl = document.getElementById("seed-track");
            const resultsEl = document.getElementById("results");
            const errorEl = document.getElementById("error");
            const loadingEl = document.getElementById("loading");

            let currentAudio = null;

            form.addEventListener("submit", async (e) => {
                e.preventDefault();
                await search();
            });

            async function search() {
                const reference = referenceInput.value.trim();
                if (!reference) return;
                const limit = parseInt(document.getElementById("limit").value, 10);

                stopAudio();
                seedEl.classList.add("hidden");
                resultsEl.innerHTML = "";
                errorEl.classList.add("hidden");
                loadingEl.classList.remove("hidden");
                searchBtn.disabled = true;

                try {
                    const resp = await fetch("/api/similar", {
                        method: "POST",
                        headers: { "Content-Type": "application/json" },
                        body: JSON.stringify({ reference, limit }),
                    });
                    if (!resp.ok) {
                        const data = await resp.json().catch(() => ({}));
                        const message = data.error && data.error.message;
                        throw new Error(message || `Request failed (${resp.status})`);
                    }
                    const data = await resp.json();
                    renderTrack(seedEl, data.seed_track);
                    seedEl.classList.remove("hidden");
                    renderResults(data.similar_tracks);
                } catch (err) {
                    errorEl.textContent = err.message;
                    errorEl.classList.remove("hidden");
                } finally {
                    loadingEl.classList.add("hidden");
                    searchBtn.disabled = false;
                }
            }

            function badges(track) {
                let html = "";
                if (track.tempo) {
                    html += `<span class="badge">${Math.round(track.tempo)} BPM</span>`;
                }
                if (track.match_score !== undefined && track.match_score !== null) {
                    html += `<span class="badge">match ${(track.match_score * 100).toFixed(0)}%</span>`;
                }
                (track.tags || []).forEach((tag) => {
                    html += `<span class="badge tag">${esc(tag)}</span>`;
                });
                return html;
            }

            function renderTrack(el, track) {
                const title = track.external_url
                    ? `<a href="${track.external_url}" target="_blank" rel="noopener">${esc(track.name)}</a>`
                    : esc(track.name);
                const detail = [track.artists.join(", "), track.album]
                    .filter(Boolean)
                    .map(esc)
                    .join(" — ");
                el.innerHTML = `
                    ${track.artwork_url ? `<img src="${track.artwork_url}" alt="" />` : ""}
                    <div class="track-info">
                        <div class="name">${title}</div>
                        <div class="detail">${detail}</div>
                        <div>${badges(track)}</div>
                    </div>
                    ${track.preview_url
                        ? `<button class="play-btn" data-url="${track.preview_url}" title="Preview">&#9654;</button>`
                        : ""}
                `;
            }

            function renderResults(tracks) {
                if (!tracks.length) {
                    resultsEl.innerHTML = "<p>No similar tracks found.</p>";
                    return;
                }
                let html = `<h3>Similar Tracks (${tracks.length})</h3>`;
                resultsEl.innerHTML = html;
                tracks.forEach((track) => {
                    const card = document.createElement("div");
                    card.className = "track-card";
                    renderTrack(card, track);
                    resultsEl.appendChild(card);
                });
                document.querySelectorAll(".play-btn").forEach((btn) => {
                    btn.addEventListener("click", () => togglePreview(btn));
                });
            }

            function togglePreview(btn) {
                const url = btn.dataset.url;
                if (currentAudio && currentAudio.src === url) {
                    stopAudio();
                    return;
                }
                stopAudio();
                currentAudio = new Audio(url);
                currentAudio.volume = 0.5;
                currentAudio.play();
                btn.innerHTML = "&#9724;";
                currentAudio.addEventListener("ended", () => {
                    btn.innerHTML = "&#9654;";
                    currentAudio = null;
                });
            }

            function stopAudio() {
                if (currentAudio) {
                    currentAudio.pause();
                    currentAudio = null;
                }
                document.querySelectorAll(".play-btn").forEach((b) => {
                    b.innerHTML = "&#9654;";
                });
            }

            function esc(str) {
                const d = document.createElement("div");
                d.textContent = str;
                return d.innerHTML;
            }
        })();
    </script>
</body>
</html>
        "##,
    )
}
