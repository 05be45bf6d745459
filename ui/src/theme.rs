pub const GLOBAL_CSS: &str = r#"
:root {
  --bg: #1e1e1e;
  --bg-sidebar: #2e2e2e;
  --panel: #252525;
  --border: rgba(255, 255, 255, 0.08);
  --border-strong: rgba(255, 255, 255, 0.16);
  --grid: #2e2e2e;
  --axis: #555555;
  --text: #cccccc;
  --text-strong: #ffffff;
  --text-muted: #8a8a8a;
  --accent: #4b9eff;
  --accent-strong: #7ab8ff;
  --negative: #ff4136;
  --radius: 8px;
  --space-1: 4px;
  --space-2: 8px;
  --space-3: 12px;
  --space-4: 16px;
  --space-6: 24px;
  --font-body: "Inter", "SF Pro Text", system-ui, -apple-system, sans-serif;
  --font-mono: "Courier New", ui-monospace, monospace;
  --font-size-sm: 13px;
  --font-size-md: 15px;
  --transition: 140ms ease-out;
}

* { box-sizing: border-box; }
html, body {
  padding: 0;
  margin: 0;
  background: var(--bg);
  color: var(--text);
  font-family: var(--font-body);
  font-size: var(--font-size-md);
  line-height: 1.45;
  min-height: 100%;
}

h1, h2, h3 { color: var(--text-strong); font-weight: 600; }

input, select {
  background: var(--panel);
  border: 1px solid var(--border);
  color: var(--text);
  border-radius: var(--radius);
  padding: var(--space-1) var(--space-2);
  font-family: var(--font-body);
}
input[type="range"] { width: 100%; padding: 0; accent-color: var(--accent); }

button {
  font-family: var(--font-body);
  background: var(--panel);
  color: var(--text);
  border: 1px solid var(--border-strong);
  border-radius: var(--radius);
  padding: var(--space-2) var(--space-4);
  cursor: pointer;
  transition: border-color var(--transition);
}
button:hover { border-color: var(--accent); color: var(--accent-strong); }

.app-shell {
  display: grid;
  grid-template-columns: 260px 1fr;
  min-height: 100vh;
}

.sidebar {
  background: var(--bg-sidebar);
  padding: var(--space-6) var(--space-4);
}
.sidebar details summary {
  cursor: pointer;
  color: var(--text-strong);
  padding: var(--space-2) 0;
}
.sidebar label { display: block; padding: var(--space-1) 0; cursor: pointer; }

.main {
  max-width: 1200px;
  padding: var(--space-6);
}

.columns {
  display: grid;
  grid-template-columns: repeat(auto-fit, minmax(180px, 1fr));
  gap: var(--space-4);
  margin: var(--space-4) 0;
}

.field label { display: block; color: var(--text-muted); font-size: var(--font-size-sm); }
.field .value { font-family: var(--font-mono); color: var(--accent); }

.chart { margin: var(--space-4) 0; }
.chart svg { width: 100%; height: auto; display: block; }

hr { border: none; border-top: 1px solid var(--border-strong); margin: var(--space-6) 0; }

.explanations li { margin-bottom: var(--space-2); }
"#;
