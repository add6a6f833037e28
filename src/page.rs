//! The browser upload page served next to the edge route.

const ENDPOINT_PLACEHOLDER: &str = "__API_ENDPOINT__";

/// Renders the page with `endpoint` as the upload target.
pub fn render(endpoint: &str) -> String {
    // A JSON string literal is also a valid JS string literal.
    let literal = serde_json::to_string(endpoint).unwrap_or_else(|_| "\"/\"".to_string());
    PAGE_TEMPLATE.replace(ENDPOINT_PLACEHOLDER, &literal)
}

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>AI Alt Generator</title>
    <style>
        * {
            margin: 0;
            padding: 0;
            box-sizing: border-box;
        }

        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Oxygen, Ubuntu, Cantarell, sans-serif;
            background: #f4f5fb;
            min-height: 100vh;
            display: flex;
            align-items: center;
            justify-content: center;
            padding: 20px;
        }

        .container {
            background: white;
            border-radius: 20px;
            box-shadow: 0 20px 60px rgba(0,0,0,0.12);
            max-width: 860px;
            width: 100%;
            padding: 40px;
        }

        h1 {
            color: #222;
            margin-bottom: 10px;
            font-size: 2.2em;
            text-align: center;
        }

        .subtitle {
            color: #666;
            margin-bottom: 30px;
            text-align: center;
        }

        .upload-area {
            border: 3px dashed #c9cbe3;
            border-radius: 15px;
            padding: 60px 20px;
            text-align: center;
            cursor: pointer;
            transition: all 0.2s;
        }

        .upload-area:hover {
            border-color: #667eea;
        }

        .upload-area.dragover {
            border-color: #667eea;
            background: #f0f2ff;
            transform: scale(1.02);
        }

        .upload-text {
            color: #333;
            font-size: 1.4em;
            font-weight: 600;
            margin-bottom: 8px;
        }

        .upload-hint {
            color: #888;
        }

        input[type="file"] {
            display: none;
        }

        .hidden {
            display: none !important;
        }

        .preview-image {
            display: block;
            max-height: 320px;
            max-width: 100%;
            margin: 0 auto 20px;
            border-radius: 10px;
            box-shadow: 0 4px 15px rgba(0,0,0,0.1);
        }

        .loading {
            text-align: center;
            padding: 20px;
            color: #666;
        }

        .spinner {
            border: 4px solid #f3f3f3;
            border-top: 4px solid #667eea;
            border-radius: 50%;
            width: 40px;
            height: 40px;
            animation: spin 1s linear infinite;
            margin: 0 auto 12px;
        }

        @keyframes spin {
            0% { transform: rotate(0deg); }
            100% { transform: rotate(360deg); }
        }

        .error {
            background: #fee;
            border: 2px solid #fcc;
            color: #c33;
            padding: 15px;
            border-radius: 10px;
            margin: 20px 0;
        }

        .error-title {
            font-weight: 600;
            margin-bottom: 6px;
        }

        .field {
            margin-top: 18px;
        }

        .field label {
            display: block;
            font-weight: 600;
            font-size: 0.9em;
            margin-bottom: 6px;
            color: #333;
        }

        .field-row {
            display: flex;
            gap: 8px;
            align-items: flex-start;
        }

        .field-row input, .field-row textarea {
            flex: 1;
            padding: 10px;
            border: 2px solid #e0e0e0;
            border-radius: 8px;
            font-size: 14px;
            font-family: inherit;
        }

        .field-row textarea {
            min-height: 110px;
            resize: vertical;
        }

        pre.snippet {
            flex: 1;
            background: #1e1e1e;
            color: #d4d4d4;
            padding: 16px;
            border-radius: 8px;
            font-size: 13px;
            line-height: 1.5;
            overflow-x: auto;
            white-space: pre-wrap;
        }

        button {
            background: #667eea;
            color: white;
            border: none;
            padding: 10px 18px;
            border-radius: 8px;
            font-weight: 600;
            cursor: pointer;
        }

        button.outline {
            background: white;
            color: #667eea;
            border: 2px solid #667eea;
        }

        .actions {
            display: flex;
            gap: 10px;
            margin-top: 12px;
        }

        .success-title {
            color: #2f9e44;
            font-weight: 600;
        }

        .toast {
            position: fixed;
            right: 20px;
            bottom: 20px;
            background: #222;
            color: white;
            padding: 14px 18px;
            border-radius: 10px;
            box-shadow: 0 10px 30px rgba(0,0,0,0.2);
            max-width: 360px;
        }

        .toast.destructive {
            background: #c33;
        }
    </style>
</head>
<body>
    <div class="container">
        <h1>AI Alt Generator</h1>
        <p class="subtitle">Generate alt text and long descriptions for your images.</p>

        <div class="upload-area" id="uploadArea">
            <div class="upload-text">Drag your image here</div>
            <div class="upload-hint">or click to select a file</div>
            <input type="file" id="fileInput" accept="image/*" aria-label="Select image file">
        </div>

        <div class="error hidden" id="validationError"></div>

        <div class="hidden" id="sessionPanel">
            <img id="previewImage" class="preview-image" alt="Image preview">

            <div class="loading hidden" id="loading">
                <div class="spinner"></div>
                <p>Generating alt text and description...</p>
            </div>

            <div class="error hidden" id="failure">
                <div class="error-title">Processing failed</div>
                <div id="failureMessage"></div>
                <div class="actions">
                    <button class="outline" id="retryButton">Try again</button>
                    <button class="outline" id="failureNewButton">New image</button>
                </div>
            </div>

            <div class="hidden" id="result">
                <p class="success-title">Generated successfully!</p>

                <div class="field">
                    <label for="altText">Alt text (short)</label>
                    <div class="field-row">
                        <input type="text" id="altText" readonly>
                        <button class="outline" data-copy="altText" data-label="Alt text">Copy</button>
                    </div>
                </div>

                <div class="field">
                    <label for="longDesc">Long description</label>
                    <div class="field-row">
                        <textarea id="longDesc" readonly></textarea>
                        <button class="outline" data-copy="longDesc" data-label="Long description">Copy</button>
                    </div>
                </div>

                <div class="field">
                    <label>HTML snippet</label>
                    <div class="field-row">
                        <pre class="snippet" id="snippet"></pre>
                        <button class="outline" data-copy="snippet" data-label="HTML snippet">Copy</button>
                    </div>
                </div>

                <div class="actions">
                    <button id="newUploadButton">New image</button>
                </div>
            </div>
        </div>
    </div>

    <div class="toast hidden" id="toast"></div>

    <script>
        const API_ENDPOINT = __API_ENDPOINT__;
        const MIN_DISPLAY_MS = 300;

        const $ = (id) => document.getElementById(id);
        const uploadArea = $('uploadArea');
        const fileInput = $('fileInput');

        // status: idle | uploading | success | error
        let session = { status: 'idle', file: null, preview: null, result: null, error: null };
        let generation = 0;
        let inFlight = null;

        function escapeHtml(text) {
            return String(text)
                .replace(/&/g, '&amp;')
                .replace(/</g, '&lt;')
                .replace(/>/g, '&gt;')
                .replace(/"/g, '&quot;')
                .replace(/'/g, '&#39;');
        }

        function snippetFor(result) {
            const alt = escapeHtml(result.altText);
            return `<img
  src="your-image.jpg"
  alt="${alt}"
  title="${alt}"
  aria-describedby="img-description"
/>

<!-- Long description (optional, for complex images) -->
<div id="img-description" class="sr-only">
  ${escapeHtml(result.longDesc)}
</div>`;
        }

        let toastTimer = null;
        function toast(title, description, destructive) {
            const el = $('toast');
            el.textContent = `${title} ${description}`;
            el.classList.toggle('destructive', !!destructive);
            el.classList.remove('hidden');
            clearTimeout(toastTimer);
            toastTimer = setTimeout(() => el.classList.add('hidden'), 3000);
        }

        function render() {
            const active = session.status !== 'idle';
            uploadArea.classList.toggle('hidden', active);
            $('sessionPanel').classList.toggle('hidden', !active);

            $('validationError').classList.toggle('hidden', !(session.status === 'idle' && session.error));
            $('validationError').textContent = session.status === 'idle' && session.error ? session.error.message : '';

            $('previewImage').src = session.preview || '';
            $('loading').classList.toggle('hidden', session.status !== 'uploading');
            $('failure').classList.toggle('hidden', session.status !== 'error');
            $('failureMessage').textContent = session.status === 'error' ? session.error.message : '';
            $('result').classList.toggle('hidden', session.status !== 'success');

            if (session.status === 'success') {
                $('altText').value = session.result.altText;
                $('longDesc').value = session.result.longDesc;
                $('snippet').textContent = snippetFor(session.result);
            }
        }

        class UploadError extends Error {
            constructor(kind, message) {
                super(message);
                this.kind = kind;
            }
        }

        function parseProviderResponse(data) {
            const content = data && data.choices && data.choices[0] && data.choices[0].message
                ? data.choices[0].message.content
                : undefined;
            if (typeof content !== 'string' || content === '') {
                throw new UploadError('malformed-response', 'response does not contain the expected content field (choices[0].message.content)');
            }
            let parsed;
            try {
                parsed = JSON.parse(content);
            } catch (e) {
                throw new UploadError('malformed-response', `content is not a valid JSON object: ${e.message}`);
            }
            const missing = ['altText', 'longDesc'].filter((k) => !parsed || typeof parsed[k] !== 'string' || parsed[k] === '');
            if (missing.length > 0) {
                throw new UploadError('malformed-response', `response is missing ${missing.join(' and ')}`);
            }
            return { altText: parsed.altText, longDesc: parsed.longDesc };
        }

        async function upload(file) {
            const started = performance.now();
            const form = new FormData();
            form.append('image', file);

            let response;
            try {
                response = await fetch(API_ENDPOINT, { method: 'POST', body: form, signal: inFlight.signal });
            } catch (e) {
                throw new UploadError('transport', `could not reach the alt-text service: ${e.message}`);
            }
            if (!response.ok) {
                throw new UploadError('upstream-status', `HTTP error ${response.status}: ${response.statusText}`);
            }
            let data;
            try {
                data = await response.json();
            } catch (e) {
                throw new UploadError('malformed-response', `response is not valid JSON: ${e.message}`);
            }
            const result = parseProviderResponse(data);

            const elapsed = performance.now() - started;
            if (elapsed < MIN_DISPLAY_MS) {
                await new Promise((resolve) => setTimeout(resolve, MIN_DISPLAY_MS - elapsed));
            }
            return result;
        }

        function readPreview(file, ticket) {
            const reader = new FileReader();
            reader.onload = (e) => {
                if (ticket === generation) {
                    session.preview = e.target.result;
                    render();
                }
            };
            reader.readAsDataURL(file);
        }

        async function start(file) {
            if (inFlight) {
                inFlight.abort();
            }
            inFlight = new AbortController();
            const ticket = ++generation;

            session = { status: 'uploading', file, preview: session.file === file ? session.preview : null, result: null, error: null };
            readPreview(file, ticket);
            render();

            try {
                const result = await upload(file);
                if (ticket !== generation) return;
                session = { ...session, status: 'success', result };
                toast('Success!', 'Alt text and description generated.');
            } catch (err) {
                if (ticket !== generation) return;
                const error = err instanceof UploadError ? err : new UploadError('transport', String(err));
                session = { ...session, status: 'error', error };
                toast('Error', error.message, true);
            } finally {
                if (ticket === generation) {
                    inFlight = null;
                    render();
                }
            }
        }

        function selectFile(file) {
            if (!file) return;
            if (!file.type.startsWith('image/')) {
                session = { status: 'idle', file: null, preview: null, result: null, error: new UploadError('validation', 'Please select a valid image file.') };
                render();
                return;
            }
            start(file);
        }

        function retry() {
            if (session.status === 'error' && session.file) {
                start(session.file);
            }
        }

        function newUpload() {
            if (inFlight) {
                inFlight.abort();
                inFlight = null;
            }
            generation++;
            session = { status: 'idle', file: null, preview: null, result: null, error: null };
            fileInput.value = '';
            render();
        }

        function copy(text, label) {
            navigator.clipboard.writeText(text)
                .then(() => toast('Copied!', `${label} copied to clipboard.`))
                .catch(() => {});
        }

        uploadArea.addEventListener('click', () => fileInput.click());
        uploadArea.addEventListener('dragenter', (e) => {
            e.preventDefault();
            uploadArea.classList.add('dragover');
        });
        uploadArea.addEventListener('dragover', (e) => e.preventDefault());
        uploadArea.addEventListener('dragleave', (e) => {
            e.preventDefault();
            uploadArea.classList.remove('dragover');
        });
        uploadArea.addEventListener('drop', (e) => {
            e.preventDefault();
            uploadArea.classList.remove('dragover');
            selectFile(e.dataTransfer.files[0]);
        });
        fileInput.addEventListener('change', (e) => selectFile(e.target.files[0]));

        $('retryButton').addEventListener('click', retry);
        $('failureNewButton').addEventListener('click', newUpload);
        $('newUploadButton').addEventListener('click', newUpload);
        document.querySelectorAll('[data-copy]').forEach((button) => {
            button.addEventListener('click', () => {
                const target = $(button.dataset.copy);
                const text = target.tagName === 'PRE' ? target.textContent : target.value;
                copy(text, button.dataset.label);
            });
        });

        render();
    </script>
</body>
</html>
"#;
