use axum::response::{Html, IntoResponse};

/// `GET /` - the task form.
pub async fn index() -> impl IntoResponse {
    Html(INDEX_PAGE)
}

/// One text area, one button, one result block.
/// Talks to `POST /api/select`; no external assets.
static INDEX_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>Agent Selector</title>
  <style>
    *, *::before, *::after { box-sizing: border-box; }
    body { margin: 0; background: #ffffff; color: #0f172a;
           font-family: system-ui, sans-serif;
           display: flex; justify-content: center; padding: 4rem 1rem; }
    main { width: 100%; max-width: 720px; }
    h1 { font-size: 2rem; margin: 0 0 1.5rem; }
    label { display: block; font-size: .9rem; margin-bottom: .4rem; }
    textarea { display: block; width: 100%; min-height: 8rem; padding: .6rem .75rem;
               border: 1px solid #cbd5e1; border-radius: 6px; font: inherit; }
    button { margin-top: .8rem; padding: .55rem 1.1rem; border: 1px solid #cbd5e1;
             border-radius: 6px; background: #f8fafc; font: inherit; cursor: pointer; }
    button:disabled { opacity: .5; cursor: wait; }
    #result h2 { font-size: 1.3rem; margin: 2rem 0 .6rem; }
    .error { margin-top: 1.5rem; padding: .8rem 1rem; border-radius: 6px;
             background: #fef2f2; color: #991b1b; white-space: pre-wrap; }
    .hidden { display: none; }
  </style>
</head>
<body>
  <main>
    <h1>Agent Selector</h1>
    <form id="task-form">
      <label for="task">Enter the task you have:</label>
      <textarea id="task" name="task"></textarea>
      <button id="submit" type="submit">Select agent</button>
    </form>
    <section id="result" class="hidden">
      <h2>Selected Agents:</h2>
      <div id="answer"></div>
    </section>
    <div id="error" class="error hidden"></div>
  </main>
  <script>
    const form = document.getElementById('task-form');
    const button = document.getElementById('submit');
    const result = document.getElementById('result');
    const answer = document.getElementById('answer');
    const error = document.getElementById('error');

    form.addEventListener('submit', async (event) => {
      event.preventDefault();
      button.disabled = true;
      result.classList.add('hidden');
      error.classList.add('hidden');
      try {
        const res = await fetch('/api/select', {
          method: 'POST',
          headers: { 'Content-Type': 'application/json' },
          body: JSON.stringify({ task: document.getElementById('task').value }),
        });
        const body = await res.json().catch(() => ({ error: `HTTP ${res.status}` }));
        if (res.ok) {
          answer.innerHTML = body.answer_html;
          result.classList.remove('hidden');
        } else {
          error.textContent = body.error || `HTTP ${res.status}`;
          error.classList.remove('hidden');
        }
      } catch (err) {
        error.textContent = String(err);
        error.classList.remove('hidden');
      } finally {
        button.disabled = false;
      }
    });
  </script>
</body>
</html>
"#;
