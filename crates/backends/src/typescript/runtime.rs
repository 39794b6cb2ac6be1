//! The fixed `runtime.ts` every generated SDK ships with.

/// Contents of `runtime.ts`: a `fetch`-based `Client` and the `ApiError` it throws.
pub const RUNTIME_TS: &str = r#"export type BodyKind = "json" | "form" | "text" | "binary" | "unknown";
export type ResponseKind = "json" | "text" | "binary" | "none";

export interface ClientOptions {
  baseUrl: string;
  headers?: Record<string, string>;
  fetch?: typeof fetch;
}

export interface RequestOptions {
  method: string;
  path: string;
  query?: Record<string, unknown>;
  headers?: Record<string, unknown>;
  body?: unknown;
  bodyKind?: BodyKind;
  contentType?: string;
  responseKind?: ResponseKind;
}

export class ApiError extends Error {
  readonly status: number;
  readonly statusText: string;
  readonly body: unknown;

  constructor(status: number, statusText: string, body: unknown) {
    super(`HTTP ${status}: ${statusText}`);
    this.name = "ApiError";
    this.status = status;
    this.statusText = statusText;
    this.body = body;
  }
}

function appendQuery(url: URL, query: Record<string, unknown> | undefined): void {
  if (!query) {
    return;
  }
  for (const [key, value] of Object.entries(query)) {
    if (value === undefined || value === null) {
      continue;
    }
    if (Array.isArray(value)) {
      for (const item of value) {
        url.searchParams.append(key, String(item));
      }
    } else {
      url.searchParams.append(key, String(value));
    }
  }
}

function encodeBody(options: RequestOptions, headers: Headers): BodyInit | undefined {
  const { body, bodyKind, contentType } = options;
  if (body === undefined) {
    return undefined;
  }
  const isMultipart = contentType?.toLowerCase().startsWith("multipart/") ?? false;
  if (contentType && !isMultipart && !headers.has("content-type")) {
    headers.set("content-type", contentType);
  }
  switch (bodyKind) {
    case "form": {
      const entries = Object.entries(body as Record<string, unknown>).filter(
        ([, value]) => value !== undefined && value !== null,
      );
      if (isMultipart) {
        const form = new FormData();
        for (const [key, value] of entries) {
          form.append(key, value instanceof Blob ? value : String(value));
        }
        return form;
      }
      const params = new URLSearchParams();
      for (const [key, value] of entries) {
        params.append(key, String(value));
      }
      return params;
    }
    case "text":
      return String(body);
    case "binary":
      return body as BodyInit;
    default:
      if (!headers.has("content-type")) {
        headers.set("content-type", "application/json");
      }
      return JSON.stringify(body);
  }
}

async function decodeBody(response: Response, kind: ResponseKind): Promise<unknown> {
  if (response.status === 204 || kind === "none") {
    return undefined;
  }
  switch (kind) {
    case "binary":
      return response.blob();
    case "text":
      return response.text();
    default: {
      const text = await response.text();
      return text.length > 0 ? JSON.parse(text) : undefined;
    }
  }
}

export class Client {
  readonly baseUrl: string;
  private readonly defaultHeaders: Record<string, string>;
  private readonly fetchImpl: typeof fetch;

  constructor(options: ClientOptions) {
    this.baseUrl = options.baseUrl.replace(/\/+$/, "");
    this.defaultHeaders = options.headers ?? {};
    this.fetchImpl = options.fetch ?? globalThis.fetch.bind(globalThis);
  }

  async request<T>(options: RequestOptions): Promise<T> {
    const url = new URL(this.baseUrl + options.path);
    appendQuery(url, options.query);

    const headers = new Headers(this.defaultHeaders);
    for (const [key, value] of Object.entries(options.headers ?? {})) {
      if (value !== undefined && value !== null) {
        headers.set(key, String(value));
      }
    }
    const body = encodeBody(options, headers);

    const response = await this.fetchImpl(url, {
      method: options.method,
      headers,
      body,
    });
    if (!response.ok) {
      let errorBody: unknown;
      try {
        errorBody = await response.text();
      } catch {
        errorBody = undefined;
      }
      throw new ApiError(response.status, response.statusText, errorBody);
    }
    return (await decodeBody(response, options.responseKind ?? "json")) as T;
  }
}
"#;
