pub fn render_index() -> String {
    INDEX_HTML.to_string()
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Days Without</title>
  <style>
    :root {
      --bg-1: #f8f3e6;
      --bg-2: #f5d3a7;
      --ink: #2b2a28;
      --accent: #ff6b4a;
      --accent-2: #2f4858;
      --card: rgba(255, 255, 255, 0.86);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #ffe9d4 60%, #f9f2e9 100%);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      display: grid;
      place-items: start center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(860px, 100%);
      background: var(--card);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 24px;
    }

    h1 {
      font-family: "Georgia", serif;
      margin: 0;
    }

    .block {
      background: white;
      border-radius: 18px;
      padding: 18px;
      border: 1px solid rgba(47, 72, 88, 0.08);
      display: grid;
      grid-template-columns: auto 1fr;
      gap: 10px 14px;
      align-items: center;
    }

    .block .time-since {
      grid-column: 1 / -1;
      margin: 0;
      min-height: 1.2em;
      color: var(--accent-2);
    }

    .block .buttons {
      grid-column: 1 / -1;
      display: flex;
      gap: 10px;
    }

    input {
      font: inherit;
      padding: 8px 10px;
      border-radius: 10px;
      border: 1px solid rgba(47, 72, 88, 0.2);
    }

    button {
      border: none;
      border-radius: 999px;
      padding: 10px 18px;
      font-size: 1rem;
      font-weight: 600;
      cursor: pointer;
      color: white;
      background: var(--accent-2);
    }

    #add-button {
      background: var(--accent);
      justify-self: start;
      font-size: 1.4rem;
    }

    .status[data-type="error"] {
      color: #c63b2b;
    }
  </style>
</head>
<body>
  <main class="app">
    <h1>Days Without</h1>
    <div id="blocks"></div>
    <button id="add-button" type="button" aria-label="Add counter">+</button>
    <div class="status" id="status"></div>
  </main>

  <script>
    const blocksEl = document.getElementById('blocks');
    const statusEl = document.getElementById('status');
    const cards = new Map();

    const setStatus = (message, type) => {
      statusEl.textContent = message;
      statusEl.dataset.type = type || '';
    };

    const request = async (method, url, body) => {
      const res = await fetch(url, {
        method,
        headers: body ? { 'content-type': 'application/json' } : {},
        body: body ? JSON.stringify(body) : undefined
      });
      if (!res.ok) {
        throw new Error((await res.text()) || 'Request failed');
      }
      return res.status === 204 ? null : res.json();
    };

    const mountCard = (id) => {
      const card = document.createElement('div');
      card.className = 'block';
      card.innerHTML = `
        <label>Days without</label>
        <input type="text" class="title-input">
        <label>Date and Time:</label>
        <input type="datetime-local" class="date-input">
        <div class="buttons">
          <button type="button" class="update-button">Update</button>
          <button type="button" class="remove-button">Remove</button>
        </div>
        <p class="time-since"></p>
      `;
      card.querySelector('.update-button').addEventListener('click', () => {
        const fields = {
          title: card.querySelector('.title-input').value,
          date: card.querySelector('.date-input').value
        };
        request('PUT', `/api/counters/${encodeURIComponent(id)}`, fields)
          .then(render)
          .catch((err) => setStatus(err.message, 'error'));
      });
      card.querySelector('.remove-button').addEventListener('click', () => {
        request('DELETE', `/api/counters/${encodeURIComponent(id)}`)
          .then(() => unmount(id))
          .catch((err) => setStatus(err.message, 'error'));
      });
      blocksEl.appendChild(card);
      cards.set(id, card);
      return card;
    };

    const render = (counter) => {
      const card = cards.get(counter.id) || mountCard(counter.id);
      card.querySelector('.title-input').value = counter.title;
      if (counter.input_value) {
        card.querySelector('.date-input').value = counter.input_value;
      }
      card.querySelector('.time-since').textContent = counter.message || '';
    };

    const unmount = (id) => {
      const card = cards.get(id);
      if (card) {
        card.remove();
        cards.delete(id);
      }
    };

    document.getElementById('add-button').addEventListener('click', () => {
      request('POST', '/api/counters', { title: '', date: '' })
        .then(render)
        .catch((err) => setStatus(err.message, 'error'));
    });

    request('GET', '/api/counters')
      .then((counters) => counters.forEach(render))
      .catch((err) => setStatus(err.message, 'error'));
  </script>
</body>
</html>
"#;
