//! Embedded page skeleton and patch applier.
//!
//! The page holds one empty container per region. The script loads a
//! snapshot, then polls for patches and applies them in sequence order,
//! reloading the snapshot whenever the server answers with a reset. Clicks
//! are translated into operator events and posted back; nothing is rendered
//! client-side.

/// The complete panel page.
pub const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>switchboard</title>
<style>
:root {
  --bg: #0d1117;
  --surface: #161b22;
  --border: #30363d;
  --text: #e6edf3;
  --muted: #8b949e;
  --accent: #58a6ff;
  --green: #238636;
  --red: #da3633;
  --radius: 6px;
  --font: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
  --mono: 'SF Mono', 'Cascadia Code', 'Fira Code', monospace;
}

* { margin: 0; padding: 0; box-sizing: border-box; }
body { background: var(--bg); color: var(--text); font-family: var(--font); font-size: 14px; }

header { display: flex; align-items: center; justify-content: space-between;
  padding: 12px 20px; border-bottom: 1px solid var(--border); background: var(--surface); }
header h1 { font-size: 16px; font-weight: 600; }

main { display: grid; grid-template-columns: 2fr 1fr; gap: 16px; padding: 16px 20px; }
section { background: var(--surface); border: 1px solid var(--border); border-radius: var(--radius); padding: 12px; }
section h2 { font-size: 12px; text-transform: uppercase; color: var(--muted); margin-bottom: 8px; }

.btn { display: inline-block; border: 1px solid var(--border); border-radius: var(--radius);
  padding: 4px 10px; background: var(--bg); color: var(--text); cursor: pointer; font-size: 13px; }
.btn-success { background: var(--green); }
.btn-danger { background: var(--red); }
.btn-primary { background: var(--accent); color: var(--bg); }
.hide { display: none; }
.form-control { width: 100%; padding: 4px 6px; background: var(--bg); color: var(--text);
  border: 1px solid var(--border); border-radius: 4px; font-family: var(--mono); }

.scenario { position: relative; min-height: 320px; }
.step { position: absolute; padding: 6px 8px; border: 1px solid var(--border); border-radius: var(--radius);
  background: var(--bg); cursor: pointer; overflow: hidden; white-space: nowrap; text-overflow: ellipsis; }
.step.current { border-color: var(--accent); box-shadow: 0 0 0 1px var(--accent) inset; }

.command { margin-bottom: 8px; }
.input-group { display: flex; gap: 6px; }
.options table { width: 100%; border-collapse: collapse; }
.options td { padding: 3px 4px; }
.output pre { font-family: var(--mono); font-size: 12px; white-space: pre-wrap;
  border-bottom: 1px solid var(--border); padding: 6px 0; }
</style>
</head>
<body>
<header>
  <h1>switchboard</h1>
  <div class="header" data-region="header"></div>
</header>
<main>
  <section>
    <h2>Circuit</h2>
    <div class="scenario" data-region="circuit"></div>
  </section>
  <div>
    <section>
      <h2>Commands</h2>
      <div class="controls" data-region="menu"></div>
    </section>
    <section class="options">
      <h2>Parameters</h2>
      <table><tbody data-region="options"></tbody></table>
    </section>
  </div>
  <section style="grid-column: 1 / -1">
    <h2>Output</h2>
    <div class="output" data-region="output"></div>
  </section>
</main>
<script>
// ---------------------------------------------------------------------------
// Patch application
// ---------------------------------------------------------------------------
let seq = 0;

function region(name) {
  return document.querySelector('[data-region="' + name + '"]');
}

function keyed(container, key) {
  for (const child of container.children) {
    if (child.dataset.key === key) return child;
  }
  return null;
}

function fragment(html, inTable) {
  const holder = document.createElement(inTable ? 'tbody' : 'div');
  holder.innerHTML = html;
  return holder.firstElementChild;
}

function applyDelta(el, d) {
  for (const [name, value] of Object.entries(d.set_attrs || {})) {
    el.setAttribute(name, value);
    if (name === 'value' && 'value' in el) el.value = value;
  }
  for (const name of d.remove_attrs || []) el.removeAttribute(name);
  for (const c of d.add_classes || []) el.classList.add(c);
  for (const c of d.remove_classes || []) el.classList.remove(c);
  if (d.style !== undefined) el.setAttribute('style', d.style);
  if (d.replace_children !== undefined) {
    el.innerHTML = d.replace_children;
  } else if (d.text !== undefined) {
    el.textContent = d.text;
  }
  for (const c of d.children || []) {
    const child = el.children[c.index];
    if (child) applyDelta(child, c.delta);
  }
}

function applyPatch(p) {
  const container = region(p.region);
  if (!container) return;
  if (p.op === 'remove') {
    const el = keyed(container, p.key);
    if (el) el.remove();
  } else if (p.op === 'insert') {
    const el = fragment(p.html, container.tagName === 'TBODY');
    if (!el) return;
    container.insertBefore(el, container.children[p.index] || null);
  } else if (p.op === 'update') {
    const el = keyed(container, p.key);
    if (el) applyDelta(el, p.delta);
  }
}

async function loadSnapshot() {
  const snap = await (await fetch('/panel/snapshot')).json();
  for (const [name, html] of Object.entries(snap.regions)) {
    const container = region(name);
    if (container) container.innerHTML = html;
  }
  seq = snap.seq;
}

async function pull() {
  try {
    const batch = await (await fetch('/panel/patches?since=' + seq)).json();
    if (batch.reset) {
      await loadSnapshot();
    } else {
      for (const p of batch.patches) {
        applyPatch(p);
        seq = p.seq;
      }
    }
  } catch (e) {
    console.error(e);
  }
  setTimeout(pull, 250);
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------
function send(event) {
  return fetch('/panel/event', {
    method: 'POST',
    headers: { 'Content-Type': 'application/json' },
    body: JSON.stringify(event),
  }).catch(e => console.error(e));
}

document.addEventListener('click', ev => {
  const t = ev.target;

  if (t.closest('.loop-action')) {
    send({ type: 'toggle' });
    return;
  }

  const step = t.closest('.step');
  if (step) {
    send({ type: 'select', step: Number(step.dataset.step) });
    return;
  }

  if (t.classList.contains('command-run')) {
    const command = t.getAttribute('command');
    const input = document.querySelector('.controls input[command="' + CSS.escape(command) + '"]');
    send({ type: 'run_command', module: t.getAttribute('module'), command, args: input ? input.value : '' });
    return;
  }

  if (!t.closest('.options')) return;
  const index = Number(t.getAttribute('step'));

  if (t.classList.contains('btn-primary')) {
    const param = t.getAttribute('param');
    const input = document.querySelector('.options input[param="' + CSS.escape(param) + '"]');
    send({ type: 'confirm_param', step: index, param, value: input ? input.value : '' });
  } else if (t.classList.contains('btn-danger')) {
    send({ type: 'delete_param', step: index, param: t.getAttribute('param') });
  } else if (t.classList.contains('btn-success')) {
    send({
      type: 'add_param',
      step: index,
      name: document.querySelector('.options .new-param').value,
      value: document.querySelector('.options .new-value').value,
      kind: document.querySelector('.options select').value,
    });
  }
});

// ---------------------------------------------------------------------------
// Init
// ---------------------------------------------------------------------------
loadSnapshot().catch(e => console.error(e)).finally(pull);
</script>
</body>
</html>"##;
